//! On-disk layout of the build cache directory.
//!
//! The cache directory holds two files: the hash snapshot of the last
//! successful build and the verbatim dependency listing it was built from.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::snapshot::HashSnapshot;

/// File name of the hash snapshot within the cache directory.
pub const SNAPSHOT_FILE: &str = "hash.json";

/// File name of the cached dependency listing within the cache directory.
pub const LISTING_FILE: &str = "deps.txt";

/// Handle on a project's cache directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    cache_dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted at `cache_dir`. Nothing is touched on disk.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Returns the path of the hash snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(SNAPSHOT_FILE)
    }

    /// Returns the path of the dependency listing cache file.
    pub fn listing_path(&self) -> PathBuf {
        self.cache_dir.join(LISTING_FILE)
    }

    /// Loads the previous snapshot. See [`HashSnapshot::load`].
    pub fn load_snapshot(&self) -> Result<HashSnapshot, CacheError> {
        HashSnapshot::load(&self.snapshot_path())
    }

    /// Replaces the snapshot on disk.
    pub fn save_snapshot(&self, snapshot: &HashSnapshot) -> Result<(), CacheError> {
        snapshot.save(&self.snapshot_path())
    }

    /// Stores the dependency listing text verbatim.
    pub fn save_listing(&self, listing: &str) -> Result<(), CacheError> {
        write_atomically(&self.listing_path(), listing.as_bytes())
    }
}

/// Writes `data` to `path` through a sibling temporary file and a rename.
///
/// Creates the parent directory if needed. Either the previous content or the
/// complete new content is visible at `path`, never a partial write.
pub(crate) fn write_atomically(path: &Path, data: &[u8]) -> Result<(), CacheError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| CacheError::Io { path, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let mut file = std::fs::File::create(&tmp).map_err(io_err(&tmp))?;
    file.write_all(data).map_err(io_err(&tmp))?;
    file.sync_all().map_err(io_err(&tmp))?;
    drop(file);

    std::fs::rename(&tmp, path).map_err(io_err(path))
}
