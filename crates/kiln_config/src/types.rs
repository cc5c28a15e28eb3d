//! Configuration types deserialized from `kiln.toml`.

use serde::Deserialize;

/// Default compiler when `build.compiler` is absent.
pub const DEFAULT_COMPILER: &str = "gfortran";

/// Default flag that points the compiler at the module output directory.
pub const DEFAULT_MODULE_FLAG: &str = "-J";

/// Default static library archiver.
pub const DEFAULT_ARCHIVER: &str = "ar";

/// Default path of the external dependency-resolution tool, relative to the project root.
pub const DEFAULT_TOOL_PATH: &str = "build/depscan";

/// Default cache directory, relative to the project root.
pub const DEFAULT_CACHE_DIR: &str = ".cache";

/// The top-level project configuration parsed from `kiln.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    /// Compiler, flags, output locations and link target.
    #[serde(default)]
    pub build: BuildSection,
    /// Directories handed to the dependency tool.
    #[serde(default)]
    pub search: SearchConfig,
    /// Prebuilt libraries appended to the link line.
    #[serde(default)]
    pub library: LibraryConfig,
    /// Source files removed from every build.
    #[serde(default)]
    pub exclude: ExcludeConfig,
    /// Static library output settings.
    #[serde(default)]
    pub lib: LibTargetConfig,
    /// External dependency tool settings.
    #[serde(default)]
    pub tool: ToolConfig,
    /// Snapshot cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// The `[build]` table.
///
/// Required keys are modelled as `Option` so that a missing key surfaces as
/// [`ConfigError::MissingField`](crate::ConfigError::MissingField) instead of
/// a generic parse error.
#[derive(Debug, Default, Deserialize)]
pub struct BuildSection {
    /// Name of the linked executable.
    pub target: Option<String>,
    /// Compiler program; also used as the linker driver.
    #[serde(default)]
    pub compiler: Option<String>,
    /// Flags passed to every compile and link invocation.
    pub flags: Option<Vec<String>>,
    /// Directory that receives object files.
    pub obj_dir: Option<String>,
    /// Directory that receives module interface files.
    pub mod_dir: Option<String>,
    /// Flag prefix used to pass `mod_dir` to the compiler.
    #[serde(default)]
    pub module_flag: Option<String>,
    /// Upper bound on parallel compile workers.
    #[serde(default)]
    pub jobs: Option<usize>,
}

/// The `[search]` table.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchConfig {
    /// Directories scanned recursively.
    #[serde(default)]
    pub deep: Vec<String>,
    /// Directories scanned without descending into subdirectories.
    #[serde(default)]
    pub shallow: Vec<String>,
}

/// The `[library]` table.
#[derive(Debug, Default, Deserialize)]
pub struct LibraryConfig {
    /// Library files passed to the linker after the object list.
    #[serde(default, rename = "source-libs")]
    pub source_libs: Vec<String>,
}

/// The `[exclude]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
    /// Project-relative source paths that are never compiled or linked.
    #[serde(default)]
    pub files: Vec<String>,
}

/// The `[lib]` table.
#[derive(Debug, Default, Deserialize)]
pub struct LibTargetConfig {
    /// Static library produced by `kiln build --lib`.
    pub target: Option<String>,
    /// Archiver program.
    pub archiver: Option<String>,
}

/// The `[tool]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ToolConfig {
    /// Path to the dependency tool executable.
    pub path: Option<String>,
}

/// The `[cache]` table.
#[derive(Debug, Default, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the hash snapshot and the listing cache.
    pub dir: Option<String>,
}
