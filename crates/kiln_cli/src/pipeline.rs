//! Shared helpers for the `build` and `run` commands: project root
//! resolution, configuration loading, and the build step itself.

use std::path::{Path, PathBuf};

use kiln_build::{
    run_build, ArtifactKind, BuildMode, BuildOptions, BuildReport, ExecutionMode, ExternalTool,
    ProcessRunner,
};
use kiln_config::{ResolvedBuild, CONFIG_FILE};

use crate::{BuildArgs, GlobalArgs};

/// Walks up from `start` looking for the nearest directory containing `kiln.toml`.
///
/// Returns the directory containing `kiln.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Loads and resolves the project configuration selected by the global args.
///
/// With `--config`, a file path is loaded directly and its directory becomes
/// the project root; a directory path is used as the root. Otherwise the root
/// is found by walking up from the current directory.
pub fn load_project(global: &GlobalArgs) -> Result<ResolvedBuild, Box<dyn std::error::Error>> {
    let (root, config) = match global.config.as_deref().map(PathBuf::from) {
        Some(path) if path.is_file() => {
            let root = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let config = kiln_config::load_config_file(&path)?;
            (root, config)
        }
        Some(dir) => {
            let config = kiln_config::load_config(&dir)?;
            (dir, config)
        }
        None => {
            let root = find_project_root(&std::env::current_dir()?)?;
            let config = kiln_config::load_config(&root)?;
            (root, config)
        }
    };
    Ok(kiln_config::resolve_build(&config, &root)?)
}

/// Translates command-line flags into build options.
///
/// `--jobs` falls back to `build.jobs` from the configuration and implies a
/// parallel build.
pub fn build_options(args: &BuildArgs, build: &ResolvedBuild) -> BuildOptions {
    let mode = if args.rebuild {
        BuildMode::Full
    } else if args.incremental {
        BuildMode::Incremental
    } else {
        BuildMode::Auto
    };

    let jobs = args.jobs.map(|j| j.get()).or(build.jobs);
    let execution = if args.parallel || args.jobs.is_some() {
        ExecutionMode::Parallel { jobs }
    } else {
        ExecutionMode::Sequential
    };

    let artifact = if args.lib {
        ArtifactKind::StaticLibrary
    } else {
        ArtifactKind::Executable
    };

    BuildOptions {
        mode,
        execution,
        artifact,
    }
}

/// Runs one build with the real dependency tool and compiler processes,
/// printing status lines unless `--quiet` is set.
pub fn execute_build(
    build: &ResolvedBuild,
    options: &BuildOptions,
    global: &GlobalArgs,
) -> Result<BuildReport, Box<dyn std::error::Error>> {
    if !global.quiet {
        let kind = match options.mode {
            BuildMode::Full => "full",
            BuildMode::Incremental => "incremental",
            BuildMode::Auto => "auto",
        };
        eprintln!("   Building {} ({kind})", build.target.display());
    }

    let tool = ExternalTool::for_build(build);
    let runner = ProcessRunner::new(&build.root);
    let report = run_build(build, &tool, &runner, options)?;

    if !global.quiet {
        if report.full {
            eprintln!("   Compiled {} file(s) (full build)", report.compiled.len());
        } else {
            eprintln!(
                "   Compiled {} file(s), {} changed, {} pruned",
                report.compiled.len(),
                report.changed.len(),
                report.pruned.len()
            );
        }
        eprintln!("   Build complete: {}", report.artifact.display());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::num::NonZeroUsize;
    use tempfile::TempDir;

    const MINIMAL: &str =
        "[build]\ntarget = \"app\"\nflags = []\nobj_dir = \"obj\"\nmod_dir = \"mod\"\njobs = 3\n";

    fn global(config: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config,
        }
    }

    fn resolved() -> ResolvedBuild {
        let config = kiln_config::load_config_from_str(MINIMAL).unwrap();
        kiln_config::resolve_build(&config, Path::new("/proj")).unwrap()
    }

    #[test]
    fn find_project_root_in_current_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kiln.toml"), MINIMAL).unwrap();
        let root = find_project_root(tmp.path()).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kiln.toml"), MINIMAL).unwrap();
        let sub = tmp.path().join("src").join("nested");
        fs::create_dir_all(&sub).unwrap();
        let root = find_project_root(&sub).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = find_project_root(tmp.path());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("could not find kiln.toml"));
    }

    #[test]
    fn load_project_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, MINIMAL).unwrap();
        let build = load_project(&global(Some(path.display().to_string()))).unwrap();
        assert_eq!(build.root, tmp.path());
        assert_eq!(build.target, tmp.path().join("app"));
    }

    #[test]
    fn load_project_from_config_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kiln.toml"), MINIMAL).unwrap();
        let build = load_project(&global(Some(tmp.path().display().to_string()))).unwrap();
        assert_eq!(build.obj_dir, tmp.path().join("obj"));
    }

    #[test]
    fn load_project_reports_missing_field() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kiln.toml"), "[build]\ntarget = \"app\"\n").unwrap();
        let err = load_project(&global(Some(tmp.path().display().to_string()))).unwrap_err();
        assert!(err.to_string().contains("build.flags"));
    }

    #[test]
    fn options_default_to_auto_sequential() {
        let options = build_options(&BuildArgs::default(), &resolved());
        assert_eq!(options.mode, BuildMode::Auto);
        assert_eq!(options.execution, ExecutionMode::Sequential);
        assert_eq!(options.artifact, ArtifactKind::Executable);
    }

    #[test]
    fn parallel_uses_configured_jobs() {
        let args = BuildArgs {
            parallel: true,
            ..BuildArgs::default()
        };
        let options = build_options(&args, &resolved());
        assert_eq!(options.execution, ExecutionMode::Parallel { jobs: Some(3) });
    }

    #[test]
    fn jobs_flag_overrides_config_and_implies_parallel() {
        let args = BuildArgs {
            jobs: NonZeroUsize::new(8),
            rebuild: true,
            lib: true,
            ..BuildArgs::default()
        };
        let options = build_options(&args, &resolved());
        assert_eq!(options.execution, ExecutionMode::Parallel { jobs: Some(8) });
        assert_eq!(options.mode, BuildMode::Full);
        assert_eq!(options.artifact, ArtifactKind::StaticLibrary);
    }

    #[test]
    fn incremental_flag_selects_strict_mode() {
        let args = BuildArgs {
            incremental: true,
            ..BuildArgs::default()
        };
        assert_eq!(
            build_options(&args, &resolved()).mode,
            BuildMode::Incremental
        );
    }
}
