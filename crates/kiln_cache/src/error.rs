//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while reading or writing the build cache.
///
/// Whether an error is fatal is decided by the caller: an automatic build
/// treats [`CacheMissing`](Self::CacheMissing) and the corruption variants as
/// "no baseline" and falls back to a full rebuild, a strict incremental build
/// does not.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An incremental build was requested but no snapshot exists.
    #[error("no hash snapshot at {path}; an incremental build needs a previous successful build")]
    CacheMissing {
        /// The expected snapshot location.
        path: PathBuf,
    },

    /// The snapshot exists but could not be parsed.
    #[error("corrupt hash snapshot at {path}: {reason}")]
    SnapshotCorrupt {
        /// The snapshot file path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The snapshot format version does not match the current version.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The snapshot file path.
        path: PathBuf,
        /// The expected format version.
        expected: u32,
        /// The format version found in the file.
        actual: u32,
    },

    /// The snapshot was written with a different fingerprint scheme.
    #[error("hash scheme mismatch in {path}: expected {expected}, got {actual}")]
    AlgorithmMismatch {
        /// The snapshot file path.
        path: PathBuf,
        /// The scheme this build computes.
        expected: String,
        /// The scheme recorded in the file.
        actual: String,
    },

    /// A serialization error occurred while encoding the snapshot.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

impl CacheError {
    /// Returns `true` if the error means "no usable baseline" rather than an I/O fault.
    pub fn is_missing_or_stale(&self) -> bool {
        matches!(
            self,
            CacheError::CacheMissing { .. }
                | CacheError::SnapshotCorrupt { .. }
                | CacheError::VersionMismatch { .. }
                | CacheError::AlgorithmMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from(".cache/hash.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("hash.json"));
    }

    #[test]
    fn cache_missing_display() {
        let err = CacheError::CacheMissing {
            path: PathBuf::from(".cache/hash.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("no hash snapshot"));
        assert!(msg.contains("previous successful build"));
    }

    #[test]
    fn corrupt_display() {
        let err = CacheError::SnapshotCorrupt {
            path: PathBuf::from("hash.json"),
            reason: "EOF while parsing".to_string(),
        };
        assert!(err.to_string().contains("EOF while parsing"));
    }

    #[test]
    fn version_mismatch_display() {
        let err = CacheError::VersionMismatch {
            path: PathBuf::from("hash.json"),
            expected: 2,
            actual: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected 2"));
        assert!(msg.contains("got 1"));
    }

    #[test]
    fn missing_or_stale_classification() {
        let missing = CacheError::CacheMissing {
            path: PathBuf::from("x"),
        };
        let scheme = CacheError::AlgorithmMismatch {
            path: PathBuf::from("x"),
            expected: "xxh3-128".to_string(),
            actual: "djb2".to_string(),
        };
        let io = CacheError::Io {
            path: PathBuf::from("x"),
            source: std::io::Error::other("disk gone"),
        };
        assert!(missing.is_missing_or_stale());
        assert!(scheme.is_missing_or_stale());
        assert!(!io.is_missing_or_stale());
    }
}
