//! Source file hashing and change detection.
//!
//! Computes content fingerprints for source files and compares them against
//! the previous snapshot to identify which files are new, modified, obsolete,
//! or unchanged since the last successful build.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use kiln_common::ContentHash;
use rayon::prelude::*;

use crate::error::CacheError;
use crate::snapshot::HashSnapshot;

/// Result of comparing current fingerprints against the previous snapshot.
///
/// All sets are ordered, so two comparisons of the same inputs produce
/// identical results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Files that are not present in the previous snapshot.
    pub new_files: BTreeSet<PathBuf>,

    /// Files whose fingerprint differs from the previous snapshot.
    pub modified_files: BTreeSet<PathBuf>,

    /// Files present in the snapshot but no longer part of the project.
    pub obsolete_files: BTreeSet<PathBuf>,

    /// Files whose fingerprint matches the previous snapshot.
    pub unchanged_files: BTreeSet<PathBuf>,
}

impl ChangeSet {
    /// Returns the directly changed files (new + modified).
    pub fn changed(&self) -> BTreeSet<PathBuf> {
        self.new_files
            .union(&self.modified_files)
            .cloned()
            .collect()
    }

    /// Returns `true` if no file is new, modified, or obsolete.
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty()
            && self.modified_files.is_empty()
            && self.obsolete_files.is_empty()
    }
}

/// Utility for computing content fingerprints of source files and detecting changes.
pub struct SourceHasher;

impl SourceHasher {
    /// Computes the fingerprint of a single file.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        let content = std::fs::read(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }

    /// Computes fingerprints for project-relative `paths` under `root`.
    ///
    /// Files are read in parallel. The returned map is keyed by the
    /// project-relative path. Any unreadable file fails the whole call: a
    /// listed source that cannot be read cannot be compiled either.
    pub fn hash_files<'a, I>(
        root: &Path,
        paths: I,
    ) -> Result<BTreeMap<PathBuf, ContentHash>, CacheError>
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        let paths: Vec<&PathBuf> = paths.into_iter().collect();
        paths
            .par_iter()
            .map(|rel| -> Result<(PathBuf, ContentHash), CacheError> {
                let hash = Self::hash_file(&root.join(rel))?;
                Ok(((*rel).clone(), hash))
            })
            .collect()
    }

    /// Compares current fingerprints against the previous snapshot.
    ///
    /// A path missing from `previous` is new, a differing fingerprint is a
    /// modification, and a snapshot path missing from `current` is obsolete.
    pub fn detect_changes(
        current: &BTreeMap<PathBuf, ContentHash>,
        previous: &HashSnapshot,
    ) -> ChangeSet {
        let mut cs = ChangeSet::default();

        for (path, hash) in current {
            match previous.get(path) {
                Some(old) if old == hash => {
                    cs.unchanged_files.insert(path.clone());
                }
                Some(_) => {
                    cs.modified_files.insert(path.clone());
                }
                None => {
                    cs.new_files.insert(path.clone());
                }
            }
        }

        cs.obsolete_files = previous
            .files
            .keys()
            .filter(|p| !current.contains_key(*p))
            .cloned()
            .collect();

        cs
    }
}
