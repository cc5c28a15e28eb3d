//! `kiln run`: build the project, then launch its executable.

use std::path::{Path, PathBuf};
use std::process::Command;

use kiln_build::{ArtifactKind, BuildMode, BuildOptions, ExecutionMode};
use kiln_config::ResolvedBuild;

use crate::pipeline::{build_options, execute_build, load_project};
use crate::{GlobalArgs, RunArgs};

/// Appends the platform executable suffix when the path has no extension.
fn with_exe_suffix(path: PathBuf) -> PathBuf {
    let suffix = std::env::consts::EXE_SUFFIX;
    if suffix.is_empty() || path.extension().is_some() {
        return path;
    }
    let mut name = path.into_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// The executable `kiln run` launches: `--bin NAME` relative to the project
/// root, otherwise the configured build target.
fn executable_path(build: &ResolvedBuild, bin: Option<&str>) -> PathBuf {
    let path = match bin {
        Some(name) => build.root.join(name),
        None => build.target.clone(),
    };
    with_exe_suffix(path)
}

fn launch(executable: &Path, root: &Path, global: &GlobalArgs) -> std::io::Result<i32> {
    if !global.quiet {
        eprintln!("    Running {}", executable.display());
    }
    let status = Command::new(executable).current_dir(root).status()?;
    Ok(status.code().unwrap_or(1))
}

/// Runs the `kiln run` command.
///
/// Without `--bin` the project is built first. If the executable is still
/// missing, one full parallel rebuild is attempted before giving up. The
/// exit code of the launched program becomes the exit code of `kiln`.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    if args.build.lib {
        return Err("`kiln run` cannot run a static library; use `kiln build --lib`".into());
    }

    let build = load_project(global)?;
    let bin = args.bin.as_ref().and_then(|b| b.as_deref());

    if args.bin.is_none() {
        execute_build(&build, &build_options(&args.build, &build), global)?;
    }

    let executable = executable_path(&build, bin);
    if !executable.is_file() {
        tracing::warn!(
            executable = %executable.display(),
            "executable not found, rebuilding from scratch"
        );
        let options = BuildOptions {
            mode: BuildMode::Full,
            execution: ExecutionMode::Parallel { jobs: build.jobs },
            artifact: ArtifactKind::Executable,
        };
        execute_build(&build, &options, global)?;
        if !executable.is_file() {
            return Err(format!("executable {} not found", executable.display()).into());
        }
    }

    Ok(launch(&executable, &build.root, global)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved() -> ResolvedBuild {
        let config = kiln_config::load_config_from_str(
            "[build]\ntarget = \"bin/app\"\nflags = []\nobj_dir = \"obj\"\nmod_dir = \"mod\"\n",
        )
        .unwrap();
        kiln_config::resolve_build(&config, Path::new("/proj")).unwrap()
    }

    #[test]
    fn default_executable_is_build_target() {
        let path = executable_path(&resolved(), None);
        assert_eq!(path, with_exe_suffix(PathBuf::from("/proj/bin/app")));
    }

    #[test]
    fn bin_name_is_relative_to_root() {
        let path = executable_path(&resolved(), Some("tools/bench"));
        assert_eq!(path, with_exe_suffix(PathBuf::from("/proj/tools/bench")));
    }

    #[test]
    fn suffix_kept_when_extension_present() {
        let path = PathBuf::from("/proj/run.sh");
        assert_eq!(with_exe_suffix(path.clone()), path);
    }

    #[cfg(unix)]
    #[test]
    fn unix_has_no_suffix() {
        assert_eq!(
            with_exe_suffix(PathBuf::from("bin/app")),
            PathBuf::from("bin/app")
        );
    }

    #[test]
    fn run_rejects_library_mode() {
        let args = RunArgs {
            build: crate::BuildArgs {
                lib: true,
                ..crate::BuildArgs::default()
            },
            bin: None,
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        };
        let err = run(&args, &global).unwrap_err();
        assert!(err.to_string().contains("static library"));
    }
}
