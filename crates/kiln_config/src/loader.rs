//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::split_words;
use crate::types::ProjectConfig;
use std::path::Path;

/// File name of the project configuration, looked up at the project root.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Loads and validates a `kiln.toml` configuration from a project directory.
///
/// Reads `<project_dir>/kiln.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `kiln.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::Syntax(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    let build = &config.build;
    if build.target.as_deref().map_or(true, str::is_empty) {
        return Err(ConfigError::MissingField("build.target".to_string()));
    }
    if build.flags.is_none() {
        return Err(ConfigError::MissingField("build.flags".to_string()));
    }
    if build.obj_dir.as_deref().map_or(true, str::is_empty) {
        return Err(ConfigError::MissingField("build.obj_dir".to_string()));
    }
    if build.mod_dir.as_deref().map_or(true, str::is_empty) {
        return Err(ConfigError::MissingField("build.mod_dir".to_string()));
    }
    if build.jobs == Some(0) {
        return Err(ConfigError::ValidationError(
            "build.jobs must be at least 1".to_string(),
        ));
    }
    if build.compiler.as_deref() == Some("") {
        return Err(ConfigError::ValidationError(
            "build.compiler must not be empty".to_string(),
        ));
    }
    if build
        .module_flag
        .as_deref()
        .is_some_and(|f| f.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "build.module_flag must not be blank".to_string(),
        ));
    }
    if let Some(flags) = &build.flags {
        split_words(flags, "build.flags")?;
    }
    split_words(&config.library.source_libs, "library.source-libs")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[build]
target = "app"
flags = ["-O2"]
obj_dir = "obj"
mod_dir = "mod"
"#;

    #[test]
    fn parse_minimal_config() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.build.target.as_deref(), Some("app"));
        assert_eq!(config.build.flags.as_deref(), Some(&["-O2".to_string()][..]));
        assert!(config.build.compiler.is_none());
        assert!(config.search.deep.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[build]
target = "solver"
compiler = "ifx"
flags = ["-O3", "-fopenmp", "-O3"]
obj_dir = "obj"
mod_dir = "mod"
module_flag = "-module "
jobs = 8

[search]
deep = ["src"]
shallow = ["lib", "include"]

[library]
source-libs = ["lib/libfft.a"]

[exclude]
files = ["src/scratch.f90"]

[lib]
target = "libsolver.a"
archiver = "llvm-ar"

[tool]
path = "tools/depscan"

[cache]
dir = ".kiln-cache"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.build.compiler.as_deref(), Some("ifx"));
        assert_eq!(config.build.jobs, Some(8));
        assert_eq!(config.search.shallow, vec!["lib", "include"]);
        assert_eq!(config.library.source_libs, vec!["lib/libfft.a"]);
        assert_eq!(config.exclude.files, vec!["src/scratch.f90"]);
        assert_eq!(config.lib.archiver.as_deref(), Some("llvm-ar"));
        assert_eq!(config.tool.path.as_deref(), Some("tools/depscan"));
        assert_eq!(config.cache.dir.as_deref(), Some(".kiln-cache"));
    }

    #[test]
    fn missing_target_errors() {
        let toml = r#"
[build]
flags = []
obj_dir = "obj"
mod_dir = "mod"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "build.target"));
    }

    #[test]
    fn empty_target_errors() {
        let toml = MINIMAL.replace("target = \"app\"", "target = \"\"");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "build.target"));
    }

    #[test]
    fn missing_flags_errors() {
        let toml = r#"
[build]
target = "app"
obj_dir = "obj"
mod_dir = "mod"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "build.flags"));
    }

    #[test]
    fn empty_flag_list_is_accepted() {
        let toml = MINIMAL.replace("flags = [\"-O2\"]", "flags = []");
        let config = load_config_from_str(&toml).unwrap();
        assert_eq!(config.build.flags, Some(vec![]));
    }

    #[test]
    fn missing_dirs_error() {
        let toml = MINIMAL.replace("obj_dir = \"obj\"\n", "");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "build.obj_dir"));

        let toml = MINIMAL.replace("mod_dir = \"mod\"\n", "");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "build.mod_dir"));
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let toml = format!("{MINIMAL}jobs = 0\n");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unbalanced_quotes_are_rejected() {
        let toml = MINIMAL.replace("flags = [\"-O2\"]", "flags = [\"-DTAG='x\"]");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("build.flags")));

        let toml = format!("{MINIMAL}\n[library]\nsource-libs = [\"-L\\\"/opt\"]\n");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("source-libs")));
    }

    #[test]
    fn blank_module_flag_is_rejected() {
        let toml = format!("{MINIMAL}module_flag = \" \"\n");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let toml = "this is not valid toml {{{}}}";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }

    #[test]
    fn load_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), MINIMAL).unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.build.mod_dir.as_deref(), Some("mod"));
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }
}
