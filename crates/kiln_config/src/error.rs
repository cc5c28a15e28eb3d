//! Configuration errors.

use std::path::PathBuf;

/// Why a `kiln.toml` could not be turned into build settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        /// The configuration file that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or a table has the wrong shape.
    #[error("malformed kiln.toml: {0}")]
    Syntax(String),

    /// A key the build cannot run without is absent or empty.
    #[error("kiln.toml is missing `{0}`")]
    MissingField(String),

    /// A key is present but its value cannot be used.
    #[error("invalid kiln.toml value: {0}")]
    ValidationError(String),
}
