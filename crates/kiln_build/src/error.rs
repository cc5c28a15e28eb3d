//! Error types for the build engine.

use std::fmt;
use std::path::PathBuf;

use kiln_cache::CacheError;
use kiln_config::ConfigError;
use kiln_graph::GraphError;

/// Why an external compiler, linker or archiver process failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessFailure {
    /// The process ran and exited unsuccessfully. `None` if it was killed by a signal.
    Exit(Option<i32>),
    /// The process could not be started.
    Spawn(String),
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessFailure::Exit(Some(code)) => write!(f, "exit code {code}"),
            ProcessFailure::Exit(None) => write!(f, "terminated by signal"),
            ProcessFailure::Spawn(reason) => write!(f, "could not start: {reason}"),
        }
    }
}

/// A single source file that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileFailure {
    /// Project-relative source path.
    pub file: PathBuf,
    /// The command line that was run.
    pub command: String,
    /// How the compiler failed.
    pub cause: ProcessFailure,
}

impl fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): `{}`",
            self.file.display(),
            self.cause,
            self.command
        )
    }
}

/// The link or archive step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailure {
    /// The artifact that was being produced.
    pub target: PathBuf,
    /// The command line that was run.
    pub command: String,
    /// How the linker failed.
    pub cause: ProcessFailure,
}

impl fmt::Display for LinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to produce {} ({}): `{}`",
            self.target.display(),
            self.cause,
            self.command
        )
    }
}

/// Errors that abort a build.
///
/// Any of these leaves the hash snapshot and the listing cache untouched.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The project configuration is incomplete or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The cache could not be read or written.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The dependency listing is malformed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The dependency tool could not produce usable output.
    #[error("dependency tool `{program}` failed: {reason}")]
    ExternalTool {
        /// The tool executable.
        program: String,
        /// What went wrong.
        reason: String,
    },

    /// One or more sources failed to compile.
    #[error("compilation failed:{}", list_failures(.0))]
    Compile(Vec<CompileFailure>),

    /// Two sources would compile to the same object file.
    #[error(
        "{} and {} both compile to {}; rename one of them",
        first.display(),
        second.display(),
        object.display()
    )]
    ObjectCollision {
        /// The shared object path.
        object: PathBuf,
        /// The source that claimed it first in build order.
        first: PathBuf,
        /// The later source.
        second: PathBuf,
    },

    /// The link or archive step failed.
    #[error("link failed: {0}")]
    Link(LinkFailure),

    /// An output directory could not be prepared.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

fn list_failures(failures: &[CompileFailure]) -> String {
    failures.iter().map(|f| format!("\n  {f}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(file: &str, cause: ProcessFailure) -> CompileFailure {
        CompileFailure {
            file: PathBuf::from(file),
            command: format!("gfortran -c {file}"),
            cause,
        }
    }

    #[test]
    fn compile_error_lists_every_file() {
        let err = BuildError::Compile(vec![
            failure("src/a.f90", ProcessFailure::Exit(Some(1))),
            failure("src/b.f90", ProcessFailure::Exit(None)),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("compilation failed:"));
        assert!(msg.contains("src/a.f90 (exit code 1)"));
        assert!(msg.contains("src/b.f90 (terminated by signal)"));
    }

    #[test]
    fn link_error_names_target() {
        let err = BuildError::Link(LinkFailure {
            target: PathBuf::from("bin/app"),
            command: "gfortran a.o -o bin/app".to_string(),
            cause: ProcessFailure::Spawn("No such file or directory".to_string()),
        });
        let msg = err.to_string();
        assert!(msg.contains("bin/app"));
        assert!(msg.contains("could not start"));
    }

    #[test]
    fn config_error_is_transparent() {
        let err: BuildError = ConfigError::MissingField("build.target".to_string()).into();
        assert_eq!(
            err.to_string(),
            ConfigError::MissingField("build.target".to_string()).to_string()
        );
    }
}
