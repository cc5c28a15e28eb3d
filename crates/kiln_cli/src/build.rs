//! `kiln build`: compile what changed and link the project.

use crate::pipeline::{build_options, execute_build, load_project};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `kiln build` command.
///
/// Returns exit code 0 on success; build failures surface as errors.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let build = load_project(global)?;
    let options = build_options(args, &build);
    execute_build(&build, &options, global)?;
    Ok(0)
}
