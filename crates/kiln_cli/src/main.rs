//! Kiln CLI, the command-line interface for the kiln build orchestrator.
//!
//! Provides `kiln new` for project scaffolding, `kiln build` for incremental
//! builds, and `kiln run` for building and launching the project executable.

#![warn(missing_docs)]

mod build;
mod init;
mod pipeline;
mod run;

use std::num::NonZeroUsize;
use std::process;

use clap::{Args, Parser, Subcommand};

/// Kiln: an incremental build orchestrator for compiled-language projects.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Incremental build orchestrator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `kiln.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new kiln project.
    New {
        /// Project name; a directory with this name is created.
        name: String,
    },
    /// Build the current project.
    Build(BuildArgs),
    /// Build the current project and run its executable.
    Run(RunArgs),
}

/// Arguments shared by `kiln build` and `kiln run`.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Compile independent sources in parallel.
    #[arg(short = 'j', long)]
    pub parallel: bool,

    /// Recompile every source, ignoring the hash snapshot.
    #[arg(short, long)]
    pub rebuild: bool,

    /// Require an incremental build; fail if there is no usable snapshot.
    #[arg(long, conflicts_with = "rebuild")]
    pub incremental: bool,

    /// Archive the objects into the `[lib]` static library instead of linking.
    #[arg(long)]
    pub lib: bool,

    /// Maximum number of concurrent compiles (implies `--parallel`).
    #[arg(long)]
    pub jobs: Option<NonZeroUsize>,
}

/// Arguments for the `kiln run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Build settings used before running.
    #[command(flatten)]
    pub build: BuildArgs,

    /// Run an existing executable without building. An optional name selects
    /// an executable relative to the project root instead of `build.target`.
    #[arg(long, num_args = 0..=1, value_name = "NAME")]
    pub bin: Option<Option<String>>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

/// Installs the log subscriber. `RUST_LOG` overrides the level chosen by flags.
fn init_tracing(global: &GlobalArgs) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_level = if global.quiet {
        "warn"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(global.verbose)
                .without_time(),
        )
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::New { ref name } => init::run(name, &global),
        Command::Build(ref args) => build::run(args, &global),
        Command::Run(ref args) => run::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
