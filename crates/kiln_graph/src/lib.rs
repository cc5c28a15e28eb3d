//! Dependency graph construction and rebuild propagation.
//!
//! The graph is built from the dependency listing emitted by the external
//! dependency tool. From a set of directly changed files it computes the full
//! set of files that must be recompiled, and it splits any file set into
//! batches that can be compiled in parallel without violating dependencies.

#![warn(missing_docs)]

pub mod batches;
pub mod error;
pub mod graph;
pub mod listing;
pub mod propagate;

pub use batches::{build_batches, BatchPlan};
pub use error::GraphError;
pub use graph::{DependencyGraph, FileNode};
pub use listing::parse_dependency_listing;
pub use propagate::{propagate, RebuildSet};
