//! Shared foundational types used across the kiln build orchestrator.
//!
//! This crate provides the content fingerprint used for change detection and
//! the path helpers that give every source file a stable identity and object
//! file location.

#![warn(missing_docs)]

pub mod hash;
pub mod path;

pub use hash::{ContentHash, ParseHashError, HASH_ALGORITHM};
pub use path::{normalize_source_path, object_path_for};
