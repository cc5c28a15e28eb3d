//! The per-build dependency graph.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use kiln_common::ContentHash;

/// One known source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Project-relative identity of the file.
    pub path: PathBuf,
    /// Files this file requires (modules it uses, files it includes).
    pub dependencies: BTreeSet<PathBuf>,
    /// Content fingerprint for the current build, once computed.
    pub fingerprint: Option<ContentHash>,
}

impl FileNode {
    fn leaf(path: PathBuf) -> Self {
        Self {
            path,
            dependencies: BTreeSet::new(),
            fingerprint: None,
        }
    }

    /// Returns `true` if the file declares no dependencies.
    pub fn is_leaf(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// Mapping from file identity to its declared dependencies, plus the inverse
/// dependents index.
///
/// Both directions are kept in sync on every mutation. Every path that
/// appears on either side of an edge has a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: BTreeMap<PathBuf, FileNode>,
    dependents: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `path` depends on every path in `dependencies`.
    ///
    /// Repeated records for the same file merge their dependency sets.
    pub fn add_record<I>(&mut self, path: PathBuf, dependencies: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.nodes
            .entry(path.clone())
            .or_insert_with(|| FileNode::leaf(path.clone()));

        for dep in dependencies {
            self.nodes
                .entry(dep.clone())
                .or_insert_with(|| FileNode::leaf(dep.clone()));
            self.dependents
                .entry(dep.clone())
                .or_default()
                .insert(path.clone());
            if let Some(node) = self.nodes.get_mut(&path) {
                node.dependencies.insert(dep);
            }
        }
    }

    /// Removes a file, keeping the paths that ran through it.
    ///
    /// Every file that depended on `path` now depends directly on the
    /// dependencies of `path`, so in `a <- b <- c` removing `b` still lets a
    /// change to `a` reach `c`.
    pub fn remove_file(&mut self, path: &Path) {
        let mut bridged = BTreeSet::new();
        if let Some(node) = self.nodes.remove(path) {
            for dep in node.dependencies {
                if let Some(users) = self.dependents.get_mut(&dep) {
                    users.remove(path);
                }
                if dep != path {
                    bridged.insert(dep);
                }
            }
        }
        let Some(users) = self.dependents.remove(path) else {
            return;
        };
        for user in users {
            if user == path {
                continue;
            }
            if let Some(node) = self.nodes.get_mut(&user) {
                node.dependencies.remove(path);
            }
            self.add_record(user, bridged.iter().cloned());
        }
    }

    /// Returns the node for `path`.
    pub fn node(&self, path: &Path) -> Option<&FileNode> {
        self.nodes.get(path)
    }

    /// Returns `true` if `path` is a node of the graph.
    pub fn contains(&self, path: &Path) -> bool {
        self.nodes.contains_key(path)
    }

    /// Direct dependencies of `path`; empty for leaves and unknown paths.
    pub fn dependencies_of(&self, path: &Path) -> impl Iterator<Item = &PathBuf> {
        self.nodes
            .get(path)
            .into_iter()
            .flat_map(|n| n.dependencies.iter())
    }

    /// Files that directly declare `path` as a dependency.
    pub fn dependents_of(&self, path: &Path) -> impl Iterator<Item = &PathBuf> {
        self.dependents.get(path).into_iter().flatten()
    }

    /// All file identities, in sorted order.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.nodes.keys()
    }

    /// Number of files in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no files.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stores the current fingerprint of each listed file.
    ///
    /// Paths that are not nodes of the graph are ignored.
    pub fn set_fingerprints(&mut self, fingerprints: &BTreeMap<PathBuf, ContentHash>) {
        for (path, hash) in fingerprints {
            if let Some(node) = self.nodes.get_mut(path) {
                node.fingerprint = Some(*hash);
            }
        }
    }

    /// Returns the fingerprints computed so far.
    pub fn fingerprints(&self) -> BTreeMap<PathBuf, ContentHash> {
        self.nodes
            .values()
            .filter_map(|n| n.fingerprint.map(|h| (n.path.clone(), h)))
            .collect()
    }
}
