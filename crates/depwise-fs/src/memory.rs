//! In-memory filesystem, used by tests and by hosts that already hold file contents.

use crate::paths::normalize_syntactic;
use crate::{DiscoveryOptions, FileMatch, FileSystem};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Filesystem backed by a map from absolute path to contents.
///
/// Directories are implicit: a directory exists iff some file lives under it.
/// Cloning shares the underlying storage.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    project_root: PathBuf,
    files: Arc<RwLock<BTreeMap<PathBuf, String>>>,
}

impl MemoryFileSystem {
    /// Create an empty filesystem rooted at `project_root` (e.g. `/project`).
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: normalize_syntactic(project_root.as_ref()),
            files: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Builder-style helper that adds a file. Relative paths resolve against the root.
    pub fn with_file(self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        let path = self.resolve(path.as_ref());
        self.files.write().insert(path, contents.into());
        self
    }

    /// Snapshot of a file's contents, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.resolve(path.as_ref());
        self.files.read().get(&path).cloned()
    }

    /// Number of files stored.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize_syntactic(path)
        } else {
            normalize_syntactic(&self.project_root.join(path))
        }
    }

    fn validate_path(&self, path: &Path) -> io::Result<PathBuf> {
        let resolved = self.resolve(path);
        if !resolved.starts_with(&self.project_root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!(
                    "Path traversal detected: {} is outside {}",
                    resolved.display(),
                    self.project_root.display()
                ),
            ));
        }
        Ok(resolved)
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )
    }
}

#[async_trait::async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let path = self.validate_path(path)?;
        let files = self.files.read();
        Ok(files.contains_key(&path) || files.keys().any(|p| p.starts_with(&path)))
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let path = self.validate_path(path)?;
        self.files
            .read()
            .get(&path)
            .cloned()
            .ok_or_else(|| Self::not_found(&path))
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let path = self.validate_path(path)?;
        self.files.write().insert(path, contents.to_string());
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        let path = self.validate_path(path)?;
        self.files
            .write()
            .remove(&path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(&path))
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let from = self.validate_path(from)?;
        let to = self.validate_path(to)?;
        let mut files = self.files.write();
        let contents = files.remove(&from).ok_or_else(|| Self::not_found(&from))?;
        files.insert(to, contents);
        Ok(())
    }

    async fn discover_files(
        &self,
        root: &Path,
        matcher: FileMatch<'_>,
        options: &DiscoveryOptions,
    ) -> io::Result<BTreeSet<PathBuf>> {
        let root = self.validate_path(root)?;
        let files = self.files.read();

        let discovered = files
            .keys()
            .filter_map(|path| {
                let relative = path.strip_prefix(&root).ok()?;
                let components: Vec<&str> = relative
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(name) => name.to_str(),
                        _ => None,
                    })
                    .collect();
                let (dirs, file_name) = components.split_last().map(|(f, d)| (d, *f))?;

                if dirs.len() >= options.max_depth {
                    return None;
                }
                if dirs.iter().any(|d| options.is_excluded_dir(d)) {
                    return None;
                }
                if !options.include_hidden
                    && (file_name.starts_with('.') || dirs.iter().any(|d| d.starts_with('.')))
                {
                    return None;
                }
                matcher.matches(path).then(|| path.clone())
            })
            .collect();

        Ok(discovered)
    }

    fn project_root(&self) -> &Path {
        &self.project_root
    }
}
