use super::FileSystem;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn walk_files(&self, root: &Path, excluded_dirs: &[String]) -> Result<Vec<PathBuf>> {
        // Only the root listing is fatal; deeper failures are skipped below.
        fs::read_dir(root).context(format!("Failed to read directory {:?}", root))?;

        let excluded = excluded_dirs.to_vec();
        let mut files = Vec::new();

        for result in WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map_or(false, |t| t.is_dir());
                !(is_dir && excluded.iter().any(|d| entry.file_name() == d.as_str()))
            })
            .build()
        {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry, skipping");
                    continue;
                }
            };

            let is_file = match entry.file_type() {
                Some(kind) if kind.is_symlink() => entry.path().is_file(),
                Some(kind) => kind.is_file(),
                None => false,
            };
            if is_file {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }
}
