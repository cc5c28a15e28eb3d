//! The external dependency-resolution tool.
//!
//! The tool is a black box with two output modes: a topological source list
//! (one path per line) and a dependency listing (`<file>: <deps...>` records,
//! selected with `-m`). Search directories are passed as `-D` (recursive) and
//! `-d` (shallow) comma-separated lists.

use std::path::{Path, PathBuf};
use std::process::Command;

use kiln_common::normalize_source_path;
use kiln_config::{ResolvedBuild, SearchConfig};

use crate::error::BuildError;

/// Flag that switches the tool to dependency-listing mode.
pub const DEPENDENCY_MODE_FLAG: &str = "-m";

/// Source of the project's build order and dependency listing.
pub trait DependencyTool {
    /// Returns every project source in topological order, dependencies first.
    fn source_order(&self) -> Result<Vec<PathBuf>, BuildError>;

    /// Returns the raw dependency listing text.
    fn dependency_listing(&self) -> Result<String, BuildError>;
}

/// Runs the dependency tool as a child process in the project root.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: PathBuf,
    root: PathBuf,
    search: SearchConfig,
}

impl ExternalTool {
    /// Creates a tool handle from explicit settings.
    pub fn new(program: &Path, root: &Path, search: SearchConfig) -> Self {
        Self {
            program: program.to_path_buf(),
            root: root.to_path_buf(),
            search,
        }
    }

    /// Creates a tool handle for a resolved build.
    pub fn for_build(build: &ResolvedBuild) -> Self {
        Self::new(&build.tool_path, &build.root, build.search.clone())
    }

    /// Search arguments, with empty lists omitted.
    pub fn search_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.search.deep.is_empty() {
            args.push("-D".to_string());
            args.push(self.search.deep.join(","));
        }
        if !self.search.shallow.is_empty() {
            args.push("-d".to_string());
            args.push(self.search.shallow.join(","));
        }
        args
    }

    fn failure(&self, reason: impl Into<String>) -> BuildError {
        BuildError::ExternalTool {
            program: self.program.display().to_string(),
            reason: reason.into(),
        }
    }

    fn invoke(&self, dependency_mode: bool) -> Result<String, BuildError> {
        let mut args = self.search_args();
        if dependency_mode {
            args.push(DEPENDENCY_MODE_FLAG.to_string());
        }
        tracing::debug!(program = %self.program.display(), ?args, "running dependency tool");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| self.failure(format!("could not start: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            };
            return Err(self.failure(format!("{status}: {}", stderr.trim())));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.trim().is_empty() {
            return Err(self.failure("empty output"));
        }
        Ok(stdout)
    }
}

impl DependencyTool for ExternalTool {
    fn source_order(&self) -> Result<Vec<PathBuf>, BuildError> {
        Ok(parse_source_order(&self.invoke(false)?))
    }

    fn dependency_listing(&self) -> Result<String, BuildError> {
        self.invoke(true)
    }
}

/// Parses the tool's default-mode output: one source per non-blank line.
///
/// A path listed twice keeps its first position.
pub fn parse_source_order(text: &str) -> Vec<PathBuf> {
    let mut seen = std::collections::BTreeSet::new();
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(normalize_source_path)
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
