//! The end-to-end build: plan, compile, link, persist.
//!
//! 1. Ask the dependency tool for the topological source order.
//! 2. Pick a baseline: the previous snapshot for an incremental build, none
//!    for a full build.
//! 3. With a baseline, fingerprint the graph, find changed files and
//!    propagate them to their dependents.
//! 4. Compile the selected sources and link the complete object set.
//! 5. Only after both succeed, store the fresh listing and snapshot.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use kiln_cache::{CacheError, HashSnapshot, SnapshotStore, SourceHasher};
use kiln_common::object_path_for;
use kiln_config::ResolvedBuild;
use kiln_graph::{parse_dependency_listing, propagate, DependencyGraph};

use crate::changes::resolve_changes;
use crate::command::CommandRunner;
use crate::error::BuildError;
use crate::link::{link, ArtifactKind};
use crate::scheduler::{compile, ExecutionMode};
use crate::tool::DependencyTool;

/// How much of the project to rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Incremental if a usable snapshot exists, full otherwise.
    #[default]
    Auto,
    /// Recompile every source.
    Full,
    /// Incremental only; a missing or unusable snapshot is an error.
    Incremental,
}

/// Options for one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Full, incremental or automatic selection.
    pub mode: BuildMode,
    /// Sequential or parallel compiles.
    pub execution: ExecutionMode,
    /// What the link stage produces.
    pub artifact: ArtifactKind,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            mode: BuildMode::Auto,
            execution: ExecutionMode::Sequential,
            artifact: ArtifactKind::Executable,
        }
    }
}

/// Summary of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// `true` if every source was recompiled.
    pub full: bool,
    /// Files whose content differs from the previous snapshot.
    pub changed: BTreeSet<PathBuf>,
    /// Snapshot entries dropped because their file left the project.
    pub pruned: BTreeSet<PathBuf>,
    /// Sources compiled, in the order they were selected.
    pub compiled: Vec<PathBuf>,
    /// The linked executable or archived library.
    pub artifact: PathBuf,
}

/// Parses a listing and drops excluded files from the graph.
fn load_graph(listing: &str, excluded: &BTreeSet<PathBuf>) -> Result<DependencyGraph, BuildError> {
    let mut graph = parse_dependency_listing(listing)?;
    for file in excluded {
        graph.remove_file(file);
    }
    Ok(graph)
}

/// Loads the baseline snapshot for `mode`, or `None` for a full build.
fn select_baseline(
    store: &SnapshotStore,
    mode: BuildMode,
) -> Result<Option<HashSnapshot>, BuildError> {
    match mode {
        BuildMode::Full => Ok(None),
        BuildMode::Incremental => Ok(Some(store.load_snapshot()?)),
        BuildMode::Auto => match store.load_snapshot() {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(CacheError::CacheMissing { .. }) => {
                tracing::info!("no previous snapshot, building everything");
                Ok(None)
            }
            Err(e) if e.is_missing_or_stale() => {
                tracing::warn!("ignoring unusable snapshot ({e}), building everything");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        },
    }
}

/// Maps every source in `order` to its object file.
///
/// Object names come from the file stem alone, so `x/util.f90` and
/// `y/util.f90` would overwrite each other; that is an error.
fn object_paths(order: &[PathBuf], obj_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut owners: BTreeMap<PathBuf, &PathBuf> = BTreeMap::new();
    let mut objects = Vec::with_capacity(order.len());
    for source in order {
        let object = object_path_for(source, obj_dir);
        match owners.get(&object) {
            Some(first) if *first != source => {
                return Err(BuildError::ObjectCollision {
                    object,
                    first: (*first).clone(),
                    second: source.clone(),
                });
            }
            Some(_) => continue,
            None => {
                owners.insert(object.clone(), source);
                objects.push(object);
            }
        }
    }
    Ok(objects)
}

fn ensure_dir(path: &Path) -> Result<(), BuildError> {
    std::fs::create_dir_all(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Records the state of a successful build.
///
/// The listing is fetched again so the snapshot covers exactly the files the
/// tool reports now.
fn persist<T: DependencyTool>(
    build: &ResolvedBuild,
    tool: &T,
    store: &SnapshotStore,
) -> Result<(), BuildError> {
    let listing = tool.dependency_listing()?;
    let graph = load_graph(&listing, &build.excluded)?;
    let fingerprints = SourceHasher::hash_files(&build.root, graph.files())?;
    let snapshot = HashSnapshot::from_files(fingerprints);

    store.save_listing(&listing)?;
    store.save_snapshot(&snapshot)?;
    tracing::debug!(files = snapshot.len(), "saved hash snapshot");
    Ok(())
}

/// Runs one build of the project described by `build`.
///
/// Any error leaves the snapshot and listing cache as they were.
pub fn run_build<T, R>(
    build: &ResolvedBuild,
    tool: &T,
    runner: &R,
    options: &BuildOptions,
) -> Result<BuildReport, BuildError>
where
    T: DependencyTool,
    R: CommandRunner,
{
    let store = SnapshotStore::new(&build.cache_dir);

    let order: Vec<PathBuf> = tool
        .source_order()?
        .into_iter()
        .filter(|p| !build.excluded.contains(p))
        .collect();
    tracing::debug!(sources = order.len(), "resolved build order");
    let objects = object_paths(&order, &build.obj_dir)?;

    let baseline = select_baseline(&store, options.mode)?;
    let parallel = matches!(options.execution, ExecutionMode::Parallel { .. });

    let mut graph = if baseline.is_some() || parallel {
        load_graph(&tool.dependency_listing()?, &build.excluded)?
    } else {
        DependencyGraph::new()
    };

    let mut report = BuildReport {
        full: baseline.is_none(),
        changed: BTreeSet::new(),
        pruned: BTreeSet::new(),
        compiled: Vec::new(),
        artifact: PathBuf::new(),
    };

    let to_compile = match &baseline {
        None => order.clone(),
        Some(previous) => {
            let changes = resolve_changes(&build.root, &mut graph, previous)?;
            let changed = changes.changed();
            let rebuild = propagate(&changed, &graph);
            let sources: BTreeSet<&PathBuf> = order.iter().collect();
            let selected: Vec<PathBuf> = rebuild
                .in_build_order(&order)
                .into_iter()
                .filter(|p| sources.contains(p))
                .collect();
            tracing::info!(
                changed = changed.len(),
                rebuild = selected.len(),
                "incremental build"
            );
            report.changed = changed;
            report.pruned = changes.obsolete_files;
            selected
        }
    };

    ensure_dir(&build.obj_dir)?;
    ensure_dir(&build.mod_dir)?;

    compile(&to_compile, &graph, build, runner, options.execution)?;
    report.compiled = to_compile;

    report.artifact = link(&objects, build, runner, options.artifact)?;

    persist(build, tool, &store)?;
    Ok(report)
}
