//! Hash snapshot persistence and change detection for incremental builds.
//!
//! This crate fingerprints source files, persists the fingerprints of the last
//! successful build, and compares the two to find the files that changed or
//! disappeared since then.

#![warn(missing_docs)]

pub mod error;
pub mod hasher;
pub mod snapshot;
pub mod store;

pub use error::CacheError;
pub use hasher::{ChangeSet, SourceHasher};
pub use snapshot::{HashSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::{SnapshotStore, LISTING_FILE, SNAPSHOT_FILE};
