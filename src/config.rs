//! Driver configuration and file roles

use crate::parser::parse::Mode;
use std::path::{Path, PathBuf};

/// Suffix of a per-header generated-definitions file
pub const GENERATED_SUFFIX: &str = ".generated.h";
/// Suffix of a per-implementation-file forward-declarations file
pub const SYMBOLS_SUFFIX: &str = ".symbols.h";

const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "inl"];
const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx"];

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Source tree to scan
    pub root: PathBuf,
    /// Directory receiving the per-file artifacts, mirroring `root`
    pub out_dir: PathBuf,
    /// File-spanning aggregate declarations artifact
    pub aggregate: PathBuf,
    /// Include used for the reflection support header
    pub support_header: String,
    /// Namespace wrapping all generated definitions
    pub namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        let out_dir = PathBuf::from("generated");
        Self {
            root: PathBuf::from("."),
            aggregate: out_dir.join("reflection_decls.h"),
            out_dir,
            support_header: "reflection.h".to_string(),
            namespace: "reflect".to_string(),
        }
    }
}

impl Config {
    /// Where the artifact for `relative` (a path under `root`) is written.
    pub fn output_path(&self, relative: &Path, role: FileRole) -> PathBuf {
        let stem = relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = format!("{stem}{}", role.output_suffix());
        self.out_dir.join(relative.with_file_name(name))
    }
}

/// Output policy selected for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Header,
    Source,
}

impl FileRole {
    /// Role of `path` by extension, or `None` if it is not processed.
    /// Artifacts of an earlier run are never processed.
    pub fn of(path: &Path) -> Option<FileRole> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(GENERATED_SUFFIX) || name.ends_with(SYMBOLS_SUFFIX) {
            return None;
        }
        let extension = path.extension()?.to_str()?;
        if HEADER_EXTENSIONS.contains(&extension) {
            Some(FileRole::Header)
        } else if SOURCE_EXTENSIONS.contains(&extension) {
            Some(FileRole::Source)
        } else {
            None
        }
    }

    pub fn mode(self) -> Mode {
        match self {
            FileRole::Header => Mode::Header,
            FileRole::Source => Mode::Source,
        }
    }

    pub fn output_suffix(self) -> &'static str {
        match self {
            FileRole::Header => GENERATED_SUFFIX,
            FileRole::Source => SYMBOLS_SUFFIX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_roles() {
        assert_eq!(FileRole::of(Path::new("a/b.h")), Some(FileRole::Header));
        assert_eq!(FileRole::of(Path::new("a/b.hpp")), Some(FileRole::Header));
        assert_eq!(FileRole::of(Path::new("b.inl")), Some(FileRole::Header));
        assert_eq!(FileRole::of(Path::new("b.cpp")), Some(FileRole::Source));
        assert_eq!(FileRole::of(Path::new("b.c")), Some(FileRole::Source));
        assert_eq!(FileRole::of(Path::new("b.rs")), None);
        assert_eq!(FileRole::of(Path::new("Makefile")), None);
    }

    #[test]
    fn test_previous_artifacts_are_ignored() {
        assert_eq!(FileRole::of(Path::new("foo.generated.h")), None);
        assert_eq!(FileRole::of(Path::new("foo.symbols.h")), None);
    }

    #[test]
    fn test_output_path_mirrors_tree() {
        let config = Config {
            out_dir: PathBuf::from("out"),
            ..Config::default()
        };
        assert_eq!(
            config.output_path(Path::new("a/b/foo.h"), FileRole::Header),
            PathBuf::from("out/a/b/foo.generated.h")
        );
        assert_eq!(
            config.output_path(Path::new("foo.cpp"), FileRole::Source),
            PathBuf::from("out/foo.symbols.h")
        );
    }
}
