//! Error types for dependency listing parsing.

/// Errors produced while turning a dependency listing into a graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A listing line is not of the form `<file>: <deps...>`.
    #[error("malformed dependency listing at line {line}: {reason}: '{content}'")]
    MalformedListing {
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        content: String,
        /// What is wrong with the line.
        reason: &'static str,
    },
}
