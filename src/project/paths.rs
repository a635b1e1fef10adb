//! Include path resolution and the implicit source scan.

use crate::config::ReaderConfig;
use crate::error::ProjectError;
use crate::fs::FileSystem;
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};
use tracing::trace;

/// MSBuild writes `\` regardless of host; convert it where the host uses `/`.
pub fn normalize_separators(include: &str) -> Cow<'_, str> {
    if MAIN_SEPARATOR == '/' && include.contains('\\') {
        Cow::Owned(include.replace('\\', "/"))
    } else {
        Cow::Borrowed(include)
    }
}

/// Resolves an item `Include` against the project directory.
pub fn resolve_include(project_dir: &Path, include: &str) -> PathBuf {
    let include = normalize_separators(include.trim());
    clean(&project_dir.join(include.as_ref()))
}

/// Lexically collapses `.` and `..` without touching the filesystem.
/// `..` above the root stays at the root.
pub fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Anchors a relative path at the current directory.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(clean(path))
    } else {
        Ok(clean(&std::env::current_dir()?.join(path)))
    }
}

/// Recursively collects files under `dir` whose name ends in the configured
/// source extension, sorted by path. Symlinked directories are not followed,
/// nor are directories named in `scan_exclude_dirs`. Only a missing or
/// unlistable `dir` is an error.
pub fn scan_sources(
    fs: &dyn FileSystem,
    dir: &Path,
    config: &ReaderConfig,
) -> Result<Vec<PathBuf>, ProjectError> {
    if !fs.is_dir(dir) {
        return Err(ProjectError::scan(
            dir,
            anyhow::anyhow!("Not a directory: {:?}", dir),
        ));
    }

    let mut found: Vec<PathBuf> = fs
        .walk_files(dir, &config.scan_exclude_dirs)
        .map_err(|e| ProjectError::scan(dir, e))?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().ends_with(&config.source_extension))
                .unwrap_or(false)
        })
        .collect();

    found.sort();
    trace!(dir = %dir.display(), count = found.len(), "Scanned for sources");
    Ok(found)
}
