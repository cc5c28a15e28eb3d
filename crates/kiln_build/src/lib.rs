//! The incremental build engine.
//!
//! Drives the external dependency tool, decides which sources need
//! recompiling, runs the compiler (sequentially or on a worker pool), links
//! the result and records the state of every successful build.

#![warn(missing_docs)]

pub mod changes;
pub mod command;
pub mod error;
pub mod link;
pub mod pipeline;
pub mod scheduler;
pub mod tool;

pub use changes::resolve_changes;
pub use command::{
    archive_command, compile_command, link_command, CommandRunner, CommandStatus, Invocation,
    ProcessRunner,
};
pub use error::{BuildError, CompileFailure, LinkFailure, ProcessFailure};
pub use link::{link, ArtifactKind};
pub use pipeline::{run_build, BuildMode, BuildOptions, BuildReport};
pub use scheduler::{compile, effective_jobs, ExecutionMode};
pub use tool::{parse_source_order, DependencyTool, ExternalTool, DEPENDENCY_MODE_FLAG};
