//! The persisted path-to-fingerprint snapshot of the last successful build.
//!
//! Stored as JSON. The header fields pin the fingerprint scheme so that a
//! snapshot is never compared against hashes produced by a different scheme.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kiln_common::{ContentHash, HASH_ALGORITHM};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::store::write_atomically;

/// Current snapshot format version. Increment on breaking layout changes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Fingerprints of every source file as of the last successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashSnapshot {
    /// Layout version of this file.
    pub format_version: u32,

    /// Fingerprint scheme used for every entry.
    pub hash_algorithm: String,

    /// Per-source fingerprints, keyed by project-relative path.
    pub files: BTreeMap<PathBuf, ContentHash>,
}

impl Default for HashSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl HashSnapshot {
    /// Creates an empty snapshot for the current format and scheme.
    pub fn new() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            hash_algorithm: HASH_ALGORITHM.to_string(),
            files: BTreeMap::new(),
        }
    }

    /// Creates a snapshot from a complete fingerprint map.
    pub fn from_files(files: BTreeMap<PathBuf, ContentHash>) -> Self {
        Self {
            files,
            ..Self::new()
        }
    }

    /// Returns the recorded fingerprint for `path`.
    pub fn get(&self, path: &Path) -> Option<&ContentHash> {
        self.files.get(path)
    }

    /// Number of recorded files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no files are recorded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Loads a snapshot file.
    ///
    /// Fails with [`CacheError::CacheMissing`] if the file does not exist and
    /// with a corruption variant if it cannot be trusted.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::CacheMissing {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let snapshot: HashSnapshot =
            serde_json::from_str(&content).map_err(|e| CacheError::SnapshotCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                path: path.to_path_buf(),
                expected: SNAPSHOT_FORMAT_VERSION,
                actual: snapshot.format_version,
            });
        }
        if snapshot.hash_algorithm != HASH_ALGORITHM {
            return Err(CacheError::AlgorithmMismatch {
                path: path.to_path_buf(),
                expected: HASH_ALGORITHM.to_string(),
                actual: snapshot.hash_algorithm,
            });
        }
        Ok(snapshot)
    }

    /// Writes the snapshot, replacing any previous file at `path`.
    ///
    /// The new content goes to a sibling temporary file that is then renamed
    /// over `path`, so an interrupted write leaves the previous snapshot intact.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        write_atomically(path, json.as_bytes())
    }
}
