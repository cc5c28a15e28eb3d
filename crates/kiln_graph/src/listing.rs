//! Parser for the dependency listing emitted by the dependency tool.
//!
//! Each non-blank line is a record `<file>: <dep1> <dep2> ...` with a possibly
//! empty right-hand side. The separator is a `:` followed by whitespace or the
//! end of the line, so a drive letter such as `C:\src\a.f90` stays part of
//! the file name.

use kiln_common::normalize_source_path;

use crate::error::GraphError;
use crate::graph::DependencyGraph;

/// Parses a dependency listing into a [`DependencyGraph`].
///
/// Blank lines are skipped. Repeated records for the same file merge. The
/// first malformed line aborts parsing.
pub fn parse_dependency_listing(text: &str) -> Result<DependencyGraph, GraphError> {
    let mut graph = DependencyGraph::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let malformed = |reason| GraphError::MalformedListing {
            line: idx + 1,
            content: line.to_string(),
            reason,
        };

        let (file, deps) =
            split_record(line).ok_or_else(|| malformed("missing ':' separator"))?;
        let file = file.trim();
        if file.is_empty() {
            return Err(malformed("empty file name"));
        }

        let path = normalize_source_path(file);
        let deps = deps.split_whitespace().map(normalize_source_path);
        graph.add_record(path, deps);
    }

    tracing::debug!(files = graph.len(), "parsed dependency listing");
    Ok(graph)
}

fn split_record(line: &str) -> Option<(&str, &str)> {
    let mut from = 0;
    while let Some(offset) = line[from..].find(':') {
        let at = from + offset;
        let rest = &line[at + 1..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Some((&line[..at], rest));
        }
        from = at + 1;
    }
    None
}
