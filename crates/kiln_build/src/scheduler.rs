//! Compile scheduling.
//!
//! Sequential mode compiles in the given order and stops at the first failure.
//! Parallel mode splits the files into dependency-respecting batches and runs
//! each batch on a bounded rayon pool, joining before the next batch starts.
//! A batch that has started always finishes, and every failure in it is
//! reported; no further batch is started after a failed one. Files caught in a
//! dependency cycle are compiled last, one at a time, in the given order.

use std::path::{Path, PathBuf};

use kiln_config::ResolvedBuild;
use kiln_graph::{build_batches, DependencyGraph};
use rayon::prelude::*;

use crate::command::{compile_command, CommandRunner};
use crate::error::{BuildError, CompileFailure, ProcessFailure};

/// How compile commands are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One file at a time.
    Sequential,
    /// Dependency-ordered batches on a worker pool.
    Parallel {
        /// Upper bound on concurrent compiles; `None` for one per CPU.
        jobs: Option<usize>,
    },
}

/// Number of workers to use for a batch of `batch_len` files.
///
/// Never more than the batch and never zero.
pub fn effective_jobs(jobs: Option<usize>, batch_len: usize) -> usize {
    let limit = jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    limit.min(batch_len).max(1)
}

/// Compiles one source file.
fn compile_one<R: CommandRunner>(
    build: &ResolvedBuild,
    runner: &R,
    file: &Path,
) -> Result<(), CompileFailure> {
    let (invocation, _object) = compile_command(build, file);
    tracing::info!(file = %file.display(), command = %invocation, "compiling");

    let cause = match runner.run(&invocation) {
        Ok(status) if status.success() => return Ok(()),
        Ok(status) => ProcessFailure::Exit(status.code),
        Err(e) => ProcessFailure::Spawn(e.to_string()),
    };
    tracing::error!(file = %file.display(), %cause, "compile failed");
    Err(CompileFailure {
        file: file.to_path_buf(),
        command: invocation.to_string(),
        cause,
    })
}

/// Compiles `files` in order, stopping at the first failure.
fn compile_sequential<R: CommandRunner>(
    build: &ResolvedBuild,
    runner: &R,
    files: &[PathBuf],
) -> Result<(), BuildError> {
    for file in files {
        compile_one(build, runner, file).map_err(|f| BuildError::Compile(vec![f]))?;
    }
    Ok(())
}

/// Compiles every file of a batch and returns all failures, in batch order.
fn compile_batch<R: CommandRunner>(
    build: &ResolvedBuild,
    runner: &R,
    pool: Option<&rayon::ThreadPool>,
    batch: &[PathBuf],
) -> Vec<CompileFailure> {
    let run = |file: &PathBuf| compile_one(build, runner, file).err();
    match pool {
        Some(pool) => pool.install(|| batch.par_iter().filter_map(run).collect()),
        None => batch.iter().filter_map(run).collect(),
    }
}

/// Compiles `files` using `mode`.
///
/// `graph` orders the parallel batches and is not consulted in sequential
/// mode. Returns the number of files compiled.
pub fn compile<R: CommandRunner>(
    files: &[PathBuf],
    graph: &DependencyGraph,
    build: &ResolvedBuild,
    runner: &R,
    mode: ExecutionMode,
) -> Result<usize, BuildError> {
    if files.is_empty() {
        tracing::debug!("nothing to compile");
        return Ok(0);
    }

    let jobs = match mode {
        ExecutionMode::Sequential => {
            compile_sequential(build, runner, files)?;
            return Ok(files.len());
        }
        ExecutionMode::Parallel { jobs } => jobs,
    };

    let plan = build_batches(files, graph);
    let widest = plan.batches.iter().map(Vec::len).max().unwrap_or(0);
    let workers = effective_jobs(jobs, widest);

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!("failed to create thread pool ({e}), compiling sequentially");
            None
        }
    };
    tracing::debug!(
        workers,
        batches = plan.batches.len(),
        "starting parallel compile"
    );

    for (index, batch) in plan.batches.iter().enumerate() {
        tracing::debug!(batch = index, files = batch.len(), "dispatching batch");
        let failures = compile_batch(build, runner, pool.as_ref(), batch);
        if !failures.is_empty() {
            return Err(BuildError::Compile(failures));
        }
    }

    if !plan.cyclic.is_empty() {
        tracing::warn!(
            files = plan.cyclic.len(),
            "compiling cyclic dependencies sequentially"
        );
        compile_sequential(build, runner, &plan.cyclic)?;
    }

    Ok(plan.file_count())
}
