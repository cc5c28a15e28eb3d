//! Source path identity helpers shared by the graph and the build stages.

use std::path::{Path, PathBuf};

/// Normalizes a path token reported by the dependency tool into a source identity.
///
/// Strips surrounding whitespace and leading `./` segments and converts
/// backslash separators to forward slashes, so the topological listing and
/// the dependency listing agree on the key for the same file.
pub fn normalize_source_path(raw: &str) -> PathBuf {
    let mut s = raw.trim().replace('\\', "/");
    while let Some(rest) = s.strip_prefix("./") {
        s = rest.to_string();
    }
    PathBuf::from(s)
}

/// Derives the object file path for a source file.
///
/// Uses only the final path segment of `source`, with its extension stripped,
/// so `src/solver/core.f90` compiles to `<obj_dir>/core.o`.
pub fn object_path_for(source: &Path, obj_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    obj_dir.join(format!("{stem}.o"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_dot_slash() {
        assert_eq!(normalize_source_path("./src/a.f90"), PathBuf::from("src/a.f90"));
        assert_eq!(normalize_source_path("././a.f90"), PathBuf::from("a.f90"));
    }

    #[test]
    fn normalize_converts_backslashes() {
        assert_eq!(
            normalize_source_path("src\\sub\\b.f90"),
            PathBuf::from("src/sub/b.f90")
        );
    }

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize_source_path("  c.f90\r"), PathBuf::from("c.f90"));
    }

    #[test]
    fn object_path_uses_last_segment() {
        let obj = object_path_for(Path::new("src/solver/core.f90"), Path::new("obj"));
        assert_eq!(obj, PathBuf::from("obj/core.o"));
    }

    #[test]
    fn object_path_strips_any_extension() {
        let obj = object_path_for(Path::new("legacy/IO.F77"), Path::new("/out/obj"));
        assert_eq!(obj, PathBuf::from("/out/obj/IO.o"));
    }

    #[test]
    fn object_path_without_extension() {
        let obj = object_path_for(Path::new("src/main"), Path::new("obj"));
        assert_eq!(obj, PathBuf::from("obj/main.o"));
    }
}
