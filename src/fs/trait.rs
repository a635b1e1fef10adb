//! Read-only filesystem seam used by the markup reader and source scan.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Kind of an entry, as recorded without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// Abstraction over the file operations the project readers need.
///
/// Descriptor text and the implicit source scan both go through this trait so
/// readers can run against an in-memory tree in tests.
pub trait FileSystem: Send + Sync {
    fn is_dir(&self, path: &Path) -> bool;

    /// True if `path` names a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Every regular file below `root`, recursively.
    ///
    /// Symlinks to files are included; symlinked directories are not
    /// descended, nor are directories whose name is in `excluded_dirs`.
    /// Unreadable subdirectories are skipped with a warning.
    fn walk_files(&self, root: &Path, excluded_dirs: &[String]) -> Result<Vec<PathBuf>>;
}
