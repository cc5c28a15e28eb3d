//! Build resolution: turning a validated config into the immutable build settings.

use crate::error::ConfigError;
use crate::types::{
    ProjectConfig, SearchConfig, DEFAULT_ARCHIVER, DEFAULT_CACHE_DIR, DEFAULT_COMPILER,
    DEFAULT_MODULE_FLAG, DEFAULT_TOOL_PATH,
};
use kiln_common::normalize_source_path;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Fully resolved build settings for one invocation.
///
/// Directories are joined onto the project root. Source identities (such as
/// the excluded file set) stay project-relative.
#[derive(Debug, Clone)]
pub struct ResolvedBuild {
    /// Project root; external commands run with this as working directory.
    pub root: PathBuf,
    /// Executable produced by the link stage.
    pub target: PathBuf,
    /// Compiler and link driver.
    pub compiler: String,
    /// Compiler arguments: flag entries with duplicates removed, in
    /// first-seen order, each split into shell words.
    pub flags: Vec<String>,
    /// Object output directory.
    pub obj_dir: PathBuf,
    /// Module interface output directory.
    pub mod_dir: PathBuf,
    /// Flag that passes `mod_dir` to the compiler. A trailing space means the
    /// directory is a separate argument (`-module <dir>`).
    pub module_flag: String,
    /// Worker bound for parallel compiles, `None` for one per CPU.
    pub jobs: Option<usize>,
    /// Link arguments from `[library]`, in configured order, split into
    /// shell words.
    pub libraries: Vec<String>,
    /// Search directories for the dependency tool.
    pub search: SearchConfig,
    /// Sources that are never compiled or linked.
    pub excluded: BTreeSet<PathBuf>,
    /// Static library produced when building with `--lib`.
    pub lib_target: Option<PathBuf>,
    /// Archiver used for the static library.
    pub archiver: String,
    /// Dependency tool executable.
    pub tool_path: PathBuf,
    /// Directory holding the hash snapshot and the listing cache.
    pub cache_dir: PathBuf,
}

/// Resolves a validated [`ProjectConfig`] against its project root.
pub fn resolve_build(config: &ProjectConfig, root: &Path) -> Result<ResolvedBuild, ConfigError> {
    let build = &config.build;
    let required = |value: &Option<String>, field: &str| {
        value
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingField(field.to_string()))
    };

    let target = required(&build.target, "build.target")?;
    let obj_dir = required(&build.obj_dir, "build.obj_dir")?;
    let mod_dir = required(&build.mod_dir, "build.mod_dir")?;
    let flags = build
        .flags
        .as_ref()
        .ok_or_else(|| ConfigError::MissingField("build.flags".to_string()))?;

    Ok(ResolvedBuild {
        root: root.to_path_buf(),
        target: root.join(target),
        compiler: build
            .compiler
            .clone()
            .unwrap_or_else(|| DEFAULT_COMPILER.to_string()),
        flags: split_words(&dedup_flags(flags), "build.flags")?,
        obj_dir: root.join(obj_dir),
        mod_dir: root.join(mod_dir),
        module_flag: build
            .module_flag
            .clone()
            .unwrap_or_else(|| DEFAULT_MODULE_FLAG.to_string()),
        jobs: build.jobs,
        libraries: split_words(&config.library.source_libs, "library.source-libs")?,
        search: config.search.clone(),
        excluded: config
            .exclude
            .files
            .iter()
            .map(|f| normalize_source_path(f))
            .collect(),
        lib_target: config.lib.target.as_ref().map(|t| root.join(t)),
        archiver: config
            .lib
            .archiver
            .clone()
            .unwrap_or_else(|| DEFAULT_ARCHIVER.to_string()),
        tool_path: root.join(config.tool.path.as_deref().unwrap_or(DEFAULT_TOOL_PATH)),
        cache_dir: root.join(config.cache.dir.as_deref().unwrap_or(DEFAULT_CACHE_DIR)),
    })
}

impl ResolvedBuild {
    /// Arguments that tell the compiler where to write module files.
    pub fn module_args(&self) -> Vec<String> {
        let dir = self.mod_dir.to_string_lossy();
        if self.module_flag.ends_with(char::is_whitespace) {
            vec![self.module_flag.trim_end().to_string(), dir.into_owned()]
        } else {
            vec![format!("{}{dir}", self.module_flag)]
        }
    }
}

/// Splits each configured entry into shell words, so `"-L/opt/lib -lfoo"`
/// yields two arguments. Quotes group words the way a shell would.
pub(crate) fn split_words(entries: &[String], field: &str) -> Result<Vec<String>, ConfigError> {
    let mut words = Vec::new();
    for entry in entries {
        let split = shlex::split(entry).ok_or_else(|| {
            ConfigError::ValidationError(format!("{field} entry {entry:?} has an unclosed quote"))
        })?;
        words.extend(split);
    }
    Ok(words)
}

/// Removes duplicate flags, keeping the first occurrence of each.
pub fn dedup_flags(flags: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    flags
        .iter()
        .filter(|f| seen.insert(f.as_str()))
        .cloned()
        .collect()
}
