//! Splitting a file set into dependency-respecting parallel batches.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::graph::DependencyGraph;

/// Execution plan for a set of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    /// Batches in execution order. No file depends on a file in its own or a
    /// later batch.
    pub batches: Vec<Vec<PathBuf>>,
    /// Files that could not be placed because of a dependency cycle, in the
    /// given order. Empty for acyclic inputs.
    pub cyclic: Vec<PathBuf>,
}

impl BatchPlan {
    /// Total number of files in the plan.
    pub fn file_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum::<usize>() + self.cyclic.len()
    }
}

/// Groups `files` into batches.
///
/// A file joins the next batch once every dependency it has inside `files`
/// sits in an earlier batch. Dependencies outside `files` are treated as
/// already built, and a file's dependency on itself is ignored. Within a
/// batch files keep their relative order from `files`. Duplicates in `files`
/// are dropped.
pub fn build_batches(files: &[PathBuf], graph: &DependencyGraph) -> BatchPlan {
    let mut seen = BTreeSet::new();
    let in_set: Vec<PathBuf> = files
        .iter()
        .filter(|p| seen.insert((*p).clone()))
        .cloned()
        .collect();
    let members = seen;

    let mut built: BTreeSet<PathBuf> = BTreeSet::new();
    let mut remaining = in_set;
    let mut plan = BatchPlan::default();

    while !remaining.is_empty() {
        let (ready, blocked): (Vec<PathBuf>, Vec<PathBuf>) =
            remaining.into_iter().partition(|file| {
                graph
                    .dependencies_of(file)
                    .filter(|dep| *dep != file && members.contains(*dep))
                    .all(|dep| built.contains(dep))
            });

        if ready.is_empty() {
            tracing::warn!(
                files = blocked.len(),
                "dependency cycle blocks batching; remaining files run sequentially"
            );
            plan.cyclic = blocked;
            break;
        }

        built.extend(ready.iter().cloned());
        plan.batches.push(ready);
        remaining = blocked;
    }

    tracing::debug!(
        batches = plan.batches.len(),
        cyclic = plan.cyclic.len(),
        "planned compile batches"
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::parse_dependency_listing;
    use std::collections::BTreeMap;

    fn paths(v: &[&str]) -> Vec<PathBuf> {
        v.iter().map(PathBuf::from).collect()
    }

    /// Asserts that no file shares a batch with, or precedes, an in-set dependency.
    fn assert_respects_dependencies(plan: &BatchPlan, graph: &DependencyGraph) {
        let mut level = BTreeMap::new();
        for (i, batch) in plan.batches.iter().enumerate() {
            for f in batch {
                level.insert(f.clone(), i);
            }
        }
        for (file, &i) in &level {
            for dep in graph.dependencies_of(file) {
                if dep == file {
                    continue;
                }
                if let Some(&j) = level.get(dep) {
                    assert!(j < i, "{file:?} in batch {i} but dependency {dep:?} in batch {j}");
                }
            }
        }
    }

    #[test]
    fn chain_yields_one_file_per_batch() {
        let g = parse_dependency_listing("a.f90:\nb.f90: a.f90\nc.f90: b.f90").unwrap();
        let plan = build_batches(&paths(&["a.f90", "b.f90", "c.f90"]), &g);
        assert_eq!(
            plan.batches,
            vec![paths(&["a.f90"]), paths(&["b.f90"]), paths(&["c.f90"])]
        );
        assert!(plan.cyclic.is_empty());
    }

    #[test]
    fn independent_files_share_a_batch() {
        let g = parse_dependency_listing(
            "base.f90:\nleft.f90: base.f90\nright.f90: base.f90\ntop.f90: left.f90 right.f90",
        )
        .unwrap();
        let order = paths(&["base.f90", "right.f90", "left.f90", "top.f90"]);
        let plan = build_batches(&order, &g);
        assert_eq!(plan.batches.len(), 3);
        assert_eq!(plan.batches[1], paths(&["right.f90", "left.f90"]));
        assert_respects_dependencies(&plan, &g);
    }

    #[test]
    fn dependencies_outside_set_are_satisfied() {
        let g = parse_dependency_listing("a.f90:\nb.f90: a.f90\nc.f90: b.f90").unwrap();
        let plan = build_batches(&paths(&["c.f90", "b.f90"]), &g);
        assert_eq!(plan.batches, vec![paths(&["b.f90"]), paths(&["c.f90"])]);
    }

    #[test]
    fn self_dependency_does_not_block() {
        let g = parse_dependency_listing("a.f90: a.f90\nb.f90: a.f90").unwrap();
        let plan = build_batches(&paths(&["a.f90", "b.f90"]), &g);
        assert_eq!(plan.batches, vec![paths(&["a.f90"]), paths(&["b.f90"])]);
        assert!(plan.cyclic.is_empty());
    }

    #[test]
    fn cycle_goes_to_final_sequential_group() {
        let g = parse_dependency_listing("a.f90:\nx.f90: a.f90 y.f90\ny.f90: x.f90\nz.f90: a.f90")
            .unwrap();
        let plan = build_batches(&paths(&["a.f90", "y.f90", "x.f90", "z.f90"]), &g);
        assert_eq!(plan.batches, vec![paths(&["a.f90"]), paths(&["z.f90"])]);
        assert_eq!(plan.cyclic, paths(&["y.f90", "x.f90"]));
        assert_eq!(plan.file_count(), 4);
    }

    #[test]
    fn files_unknown_to_graph_are_ready_immediately() {
        let g = DependencyGraph::new();
        let plan = build_batches(&paths(&["p.f90", "q.f90", "p.f90"]), &g);
        assert_eq!(plan.batches, vec![paths(&["p.f90", "q.f90"])]);
    }

    #[test]
    fn empty_input_is_empty_plan() {
        let plan = build_batches(&[], &DependencyGraph::new());
        assert!(plan.batches.is_empty());
        assert_eq!(plan.file_count(), 0);
    }
}
