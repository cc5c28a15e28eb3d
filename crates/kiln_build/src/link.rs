//! Link stage: one link or archive invocation over the complete object set.

use std::path::{Path, PathBuf};

use kiln_config::{ConfigError, ResolvedBuild};

use crate::command::{archive_command, link_command, CommandRunner, Invocation};
use crate::error::{BuildError, LinkFailure, ProcessFailure};

/// What the link stage produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactKind {
    /// The executable named by `build.target`.
    #[default]
    Executable,
    /// The static library named by `lib.target`.
    StaticLibrary,
}

fn ensure_parent(path: &Path) -> Result<(), BuildError> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent).map_err(|source| BuildError::Io {
            path: parent.to_path_buf(),
            source,
        }),
        None => Ok(()),
    }
}

fn run_link<R: CommandRunner>(
    runner: &R,
    invocation: Invocation,
    target: PathBuf,
) -> Result<PathBuf, BuildError> {
    tracing::info!(target = %target.display(), command = %invocation, "linking");
    let cause = match runner.run(&invocation) {
        Ok(status) if status.success() => return Ok(target),
        Ok(status) => ProcessFailure::Exit(status.code),
        Err(e) => ProcessFailure::Spawn(e.to_string()),
    };
    Err(BuildError::Link(LinkFailure {
        target,
        command: invocation.to_string(),
        cause,
    }))
}

/// Links `objects` into the artifact selected by `kind` and returns its path.
///
/// `objects` must be the full project object set in build order, not just
/// the objects rebuilt in this run.
pub fn link<R: CommandRunner>(
    objects: &[PathBuf],
    build: &ResolvedBuild,
    runner: &R,
    kind: ArtifactKind,
) -> Result<PathBuf, BuildError> {
    match kind {
        ArtifactKind::Executable => {
            ensure_parent(&build.target)?;
            run_link(runner, link_command(build, objects), build.target.clone())
        }
        ArtifactKind::StaticLibrary => {
            let library = build
                .lib_target
                .clone()
                .ok_or_else(|| ConfigError::MissingField("lib.target".to_string()))?;
            ensure_parent(&library)?;
            run_link(runner, archive_command(build, &library, objects), library)
        }
    }
}
