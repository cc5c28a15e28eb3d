//! `kiln new`: project scaffolding command.
//!
//! Creates a new project directory with the standard layout, a `kiln.toml`
//! config file, and a hello-world main program.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kiln_config::CONFIG_FILE;

use crate::GlobalArgs;

/// Directories created in every new project.
const PROJECT_DIRS: &[&str] = &["src", "mod", "obj", "data", "lib", "bin", ".cache"];

/// Hello-world program written to `src/main.f90`.
const MAIN_PROGRAM: &str = r#"program main
    print *, "Hello World"
end program main
"#;

/// Runs the `kiln new` command.
///
/// Creates `name` as a new directory. Fails if it already exists.
/// Returns exit code 0 on success.
pub fn run(name: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = PathBuf::from(name);
    if project_dir.exists() {
        return Err(format!("directory '{name}' already exists").into());
    }

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app")
        .to_string();

    if !global.quiet {
        eprintln!("  Creating new kiln project `{project_name}`");
    }

    create_directories(&project_dir, PROJECT_DIRS)?;
    write_config(&project_dir, &project_name)?;
    fs::write(project_dir.join("src").join("main.f90"), MAIN_PROGRAM)?;

    if !global.quiet {
        eprintln!("     Created {}", project_dir.join(CONFIG_FILE).display());
        eprintln!(
            "     Created {}",
            project_dir.join("src").join("main.f90").display()
        );
    }

    Ok(0)
}

/// Creates each of `dirs` under `root`.
fn create_directories(root: &Path, dirs: &[&str]) -> io::Result<()> {
    for dir in dirs {
        fs::create_dir_all(root.join(dir))?;
    }
    Ok(())
}

/// Renders the `kiln.toml` template for a project called `name`.
fn config_template(name: &str) -> String {
    format!(
        r#"[build]
target = "bin/{name}"
compiler = "gfortran"
flags = [
  "-cpp", "-O3",
  "-ffpe-trap=zero,invalid,overflow",
  "-Wno-unused-variable", "-Wno-unused-function",
  "-Imod",
]
obj_dir = "obj"
mod_dir = "mod"
# jobs = 4

[search]
deep = ["src"]
# shallow = ["lib", "include"]

[library]
# source-libs = ["lib/libexample.a"]

[exclude]
# Paths are relative to this file.
# files = ["src/scratch.f90"]

[lib]
# Built by `kiln build --lib`, static archives only.
# target = "lib/lib{name}.a"

[tool]
path = "build/depscan"
"#
    )
}

/// Writes the `kiln.toml` configuration file.
fn write_config(root: &Path, name: &str) -> io::Result<()> {
    fs::write(root.join(CONFIG_FILE), config_template(name))
}
