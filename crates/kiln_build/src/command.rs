//! External command construction and execution.
//!
//! Compiler, linker and archiver command lines are built here from the
//! resolved configuration and executed through a [`CommandRunner`]. Arguments
//! are passed to the process individually; no shell is involved.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use kiln_common::object_path_for;
use kiln_config::ResolvedBuild;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name or path.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status of a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub code: Option<i32>,
}

impl CommandStatus {
    /// A zero exit.
    pub const SUCCESS: CommandStatus = CommandStatus { code: Some(0) };

    /// Returns `true` for a zero exit code.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes external commands.
///
/// Implementations must be shareable across the compile workers.
pub trait CommandRunner: Sync {
    /// Runs `invocation` to completion.
    ///
    /// Returns `Err` only if the process could not be started.
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandStatus>;
}

/// Runs commands as child processes in the project root.
///
/// The child inherits stdout and stderr so compiler diagnostics reach the
/// terminal unchanged.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    cwd: PathBuf,
}

impl ProcessRunner {
    /// Creates a runner that starts every process in `cwd`.
    pub fn new(cwd: &Path) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandStatus> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&self.cwd)
            .status()?;
        Ok(CommandStatus {
            code: status.code(),
        })
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Builds the compile command for one source and returns it with the object path.
///
/// `<compiler> <flags...> <module args...> -c <source> -o <object>`
pub fn compile_command(build: &ResolvedBuild, source: &Path) -> (Invocation, PathBuf) {
    let object = object_path_for(source, &build.obj_dir);
    let invocation = Invocation::new(&build.compiler)
        .args(build.flags.iter().cloned())
        .args(build.module_args())
        .arg("-c")
        .arg(path_arg(source))
        .arg("-o")
        .arg(path_arg(&object));
    (invocation, object)
}

/// Builds the link command for the executable target.
///
/// `<compiler> <flags...> <objects...> <libraries...> -o <target>`
pub fn link_command(build: &ResolvedBuild, objects: &[PathBuf]) -> Invocation {
    Invocation::new(&build.compiler)
        .args(build.flags.iter().cloned())
        .args(objects.iter().map(|o| path_arg(o)))
        .args(build.libraries.iter().cloned())
        .arg("-o")
        .arg(path_arg(&build.target))
}

/// Builds the archive command for a static library.
///
/// `<archiver> rcs <library> <objects...>`
pub fn archive_command(build: &ResolvedBuild, library: &Path, objects: &[PathBuf]) -> Invocation {
    Invocation::new(&build.archiver)
        .arg("rcs")
        .arg(path_arg(library))
        .args(objects.iter().map(|o| path_arg(o)))
}
