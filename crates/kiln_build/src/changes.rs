//! Change resolution against the previous snapshot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kiln_cache::{ChangeSet, HashSnapshot, SourceHasher};
use kiln_common::ContentHash;
use kiln_graph::DependencyGraph;

use crate::error::BuildError;

/// Fingerprints every file in `graph` and compares against `previous`.
///
/// The fingerprints are stored on the graph nodes and the comparison reads
/// them back from there. Files recorded in `previous` but absent from the
/// graph are reported as obsolete; the next snapshot is written from the
/// graph alone, so they are never carried over.
pub fn resolve_changes(
    root: &Path,
    graph: &mut DependencyGraph,
    previous: &HashSnapshot,
) -> Result<ChangeSet, BuildError> {
    let current: BTreeMap<PathBuf, ContentHash> = SourceHasher::hash_files(root, graph.files())?;
    graph.set_fingerprints(&current);

    let changes = SourceHasher::detect_changes(&graph.fingerprints(), previous);
    if changes.is_empty() {
        tracing::debug!("no source changed since the last build");
        return Ok(changes);
    }
    for obsolete in &changes.obsolete_files {
        tracing::debug!(file = %obsolete.display(), "pruning obsolete snapshot entry");
    }
    tracing::debug!(
        new = changes.new_files.len(),
        modified = changes.modified_files.len(),
        obsolete = changes.obsolete_files.len(),
        unchanged = changes.unchanged_files.len(),
        "resolved changes"
    );

    Ok(changes)
}
