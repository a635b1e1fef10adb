use super::{FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
}

/// In-memory project tree. Relative paths are anchored at the mock root.
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            files: RwLock::new(BTreeMap::new()),
            root,
        };
        let root = fs.root.clone();
        fs.add_dir(root);
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        self.insert(
            path.as_ref(),
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(
            path.as_ref(),
            MockEntry {
                content: None,
                file_type: FileType::Directory,
            },
        );
    }

    /// Adds a symlink with no target. Walks treat it like a directory link
    /// and do not descend into it.
    pub fn add_symlink(&self, path: impl AsRef<Path>) {
        self.insert(
            path.as_ref(),
            MockEntry {
                content: None,
                file_type: FileType::Symlink,
            },
        );
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let path = self.normalize_path(path);
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(path, entry);
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }

    fn kind_of(&self, path: &Path) -> Option<FileType> {
        let path = self.normalize_path(path);
        self.files.read().unwrap().get(&path).map(|e| e.file_type)
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        self.kind_of(path) == Some(FileType::Directory)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.kind_of(path) == Some(FileType::File)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn walk_files(&self, root: &Path, excluded_dirs: &[String]) -> Result<Vec<PathBuf>> {
        let root = self.normalize_path(root);
        let files = self.files.read().unwrap();

        match files.get(&root) {
            Some(entry) if entry.file_type == FileType::Directory => {}
            Some(_) => return Err(anyhow!("Not a directory: {:?}", root)),
            None => return Err(anyhow!("Directory not found: {:?}", root)),
        }

        let blocked = |dir: &Path| {
            let linked = files.get(dir).map(|e| e.file_type) == Some(FileType::Symlink);
            let excluded = dir
                .file_name()
                .map(|n| excluded_dirs.iter().any(|d| n == d.as_str()))
                .unwrap_or(false);
            linked || excluded
        };

        let walked = files
            .iter()
            .filter(|(path, entry)| entry.file_type == FileType::File && path.starts_with(&root))
            .filter(|(path, _)| {
                path.ancestors()
                    .skip(1)
                    .take_while(|dir| *dir != root.as_path())
                    .all(|dir| !blocked(dir))
            })
            .map(|(path, _)| path.clone())
            .collect();

        Ok(walked)
    }
}
