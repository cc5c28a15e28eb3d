//! Transitive rebuild propagation over the dependents relation.

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::graph::DependencyGraph;

/// Files selected for recompilation in one build.
///
/// Remembers the order in which files were discovered. Each file appears
/// at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildSet {
    order: Vec<PathBuf>,
    members: BTreeSet<PathBuf>,
}

impl RebuildSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `path`, returning `false` if it was already present.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        if self.members.contains(&path) {
            return false;
        }
        self.members.insert(path.clone());
        self.order.push(path);
        true
    }

    /// Returns `true` if `path` is selected.
    pub fn contains(&self, path: &Path) -> bool {
        self.members.contains(path)
    }

    /// Number of selected files.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Selected files in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.order.iter()
    }

    /// Selected files as an ordered set.
    pub fn as_set(&self) -> &BTreeSet<PathBuf> {
        &self.members
    }

    /// Returns the selected files arranged in `build_order`.
    ///
    /// Selected files that do not occur in `build_order` follow at the end,
    /// in discovery order.
    pub fn in_build_order(&self, build_order: &[PathBuf]) -> Vec<PathBuf> {
        let mut seen = BTreeSet::new();
        let mut ordered: Vec<PathBuf> = build_order
            .iter()
            .filter(|p| self.members.contains(*p) && seen.insert((*p).clone()))
            .cloned()
            .collect();
        ordered.extend(self.order.iter().filter(|p| !seen.contains(*p)).cloned());
        ordered
    }
}

/// Computes every file that must be recompiled because of `changed`.
///
/// Breadth-first over dependents, starting from each changed path in sorted
/// order. A file is added the first time it is reached and never expanded
/// again, so cyclic graphs terminate. Changed paths unknown to the graph are
/// still selected.
pub fn propagate(changed: &BTreeSet<PathBuf>, graph: &DependencyGraph) -> RebuildSet {
    let mut rebuild = RebuildSet::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();

    for path in changed {
        if rebuild.insert(path.clone()) {
            queue.push_back(path.clone());
        }
    }

    while let Some(current) = queue.pop_front() {
        for user in graph.dependents_of(&current) {
            if rebuild.insert(user.clone()) {
                queue.push_back(user.clone());
            }
        }
    }

    tracing::debug!(
        changed = changed.len(),
        rebuild = rebuild.len(),
        "propagated changes to dependents"
    );
    rebuild
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::parse_dependency_listing;

    fn set(paths: &[&str]) -> BTreeSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    fn paths(v: &[&str]) -> Vec<PathBuf> {
        v.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn chain_change_reaches_every_dependent() {
        let g = parse_dependency_listing("a.f90:\nb.f90: a.f90\nc.f90: b.f90").unwrap();
        let r = propagate(&set(&["a.f90"]), &g);
        assert_eq!(r.as_set(), &set(&["a.f90", "b.f90", "c.f90"]));
        assert_eq!(r.iter().cloned().collect::<Vec<_>>(), paths(&["a.f90", "b.f90", "c.f90"]));
    }

    #[test]
    fn change_at_top_stays_local() {
        let g = parse_dependency_listing("a.f90:\nb.f90: a.f90\nc.f90: b.f90").unwrap();
        let r = propagate(&set(&["c.f90"]), &g);
        assert_eq!(r.as_set(), &set(&["c.f90"]));
    }

    #[test]
    fn empty_change_set_selects_nothing() {
        let g = parse_dependency_listing("a.f90:\nb.f90: a.f90").unwrap();
        assert!(propagate(&BTreeSet::new(), &g).is_empty());
    }

    #[test]
    fn unknown_changed_path_is_still_selected() {
        let g = parse_dependency_listing("a.f90:").unwrap();
        let r = propagate(&set(&["stray.f90"]), &g);
        assert_eq!(r.as_set(), &set(&["stray.f90"]));
    }

    #[test]
    fn diamond_visits_each_file_once() {
        let g = parse_dependency_listing(
            "base.f90:\nleft.f90: base.f90\nright.f90: base.f90\ntop.f90: left.f90 right.f90",
        )
        .unwrap();
        let r = propagate(&set(&["base.f90"]), &g);
        assert_eq!(r.len(), 4);
        assert_eq!(r.iter().last(), Some(&PathBuf::from("top.f90")));
    }

    #[test]
    fn cycle_terminates() {
        let g = parse_dependency_listing("a.f90: c.f90\nb.f90: a.f90\nc.f90: b.f90\nd.f90: d.f90")
            .unwrap();
        let r = propagate(&set(&["b.f90", "d.f90"]), &g);
        assert_eq!(r.as_set(), &set(&["a.f90", "b.f90", "c.f90", "d.f90"]));
    }

    #[test]
    fn propagation_is_deterministic() {
        let listing = "m.f90:\nx.f90: m.f90\ny.f90: m.f90 x.f90\nz.f90: y.f90";
        let g1 = parse_dependency_listing(listing).unwrap();
        let g2 = parse_dependency_listing(listing).unwrap();
        let changed = set(&["x.f90", "m.f90"]);
        assert_eq!(propagate(&changed, &g1), propagate(&changed, &g2));
    }

    #[test]
    fn build_order_rearranges_selection() {
        let g = parse_dependency_listing("a.f90:\nb.f90: a.f90\nc.f90: a.f90").unwrap();
        let r = propagate(&set(&["a.f90", "zz.f90"]), &g);
        let order = paths(&["a.f90", "c.f90", "b.f90", "other.f90"]);
        assert_eq!(
            r.in_build_order(&order),
            paths(&["a.f90", "c.f90", "b.f90", "zz.f90"])
        );
    }
}
