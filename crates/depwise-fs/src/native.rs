//! Native filesystem implementation using std::fs + tokio.

use crate::paths::normalize_syntactic;
use crate::{DiscoveryOptions, FileMatch, FileSystem};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::task;

/// Native filesystem scoped to a project root.
///
/// Blocking `std::fs` calls run on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct NativeFileSystem {
    project_root: PathBuf,
}

impl NativeFileSystem {
    /// Create a filesystem scoped to `project_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root doesn't exist or can't be canonicalized.
    pub fn new(project_root: impl AsRef<Path>) -> io::Result<Self> {
        let project_root = project_root.as_ref().canonicalize().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!(
                    "Project root does not exist: {}",
                    project_root.as_ref().display()
                ),
            )
        })?;
        Ok(Self { project_root })
    }

    /// Resolve `path` against the root and reject anything outside it.
    ///
    /// Existing paths are canonicalized so symlinks cannot escape. For paths
    /// that do not exist yet the parent is canonicalized instead, falling back
    /// to syntactic normalization.
    fn validate_path(&self, path: &Path) -> io::Result<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        };

        let resolved = match absolute.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) => match (absolute.parent(), absolute.file_name()) {
                (Some(parent), Some(file_name)) => match parent.canonicalize() {
                    Ok(parent) => parent.join(file_name),
                    Err(_) => normalize_syntactic(&absolute),
                },
                _ => normalize_syntactic(&absolute),
            },
        };

        if !resolved.starts_with(&self.project_root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!(
                    "Path traversal detected: {} is outside project root {}",
                    resolved.display(),
                    self.project_root.display()
                ),
            ));
        }

        Ok(resolved)
    }
}

fn join_error(e: task::JoinError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

#[async_trait::async_trait]
impl FileSystem for NativeFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || Ok(validated.exists()))
            .await
            .map_err(join_error)?
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || std::fs::read_to_string(&validated))
            .await
            .map_err(join_error)?
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let validated = self.validate_path(path)?;
        let contents = contents.to_string();
        task::spawn_blocking(move || std::fs::write(&validated, contents))
            .await
            .map_err(join_error)?
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || std::fs::remove_file(&validated))
            .await
            .map_err(join_error)?
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let from = self.validate_path(from)?;
        let to = self.validate_path(to)?;
        task::spawn_blocking(move || std::fs::rename(&from, &to))
            .await
            .map_err(join_error)?
    }

    async fn discover_files(
        &self,
        root: &Path,
        matcher: FileMatch<'_>,
        options: &DiscoveryOptions,
    ) -> io::Result<BTreeSet<PathBuf>> {
        let root = self.validate_path(root)?;
        let matcher = OwnedMatch::from(matcher);
        let options = options.clone();
        let project_root = self.project_root.clone();

        task::spawn_blocking(move || discover_files_sync(&root, &matcher, &options, &project_root))
            .await
            .map_err(join_error)?
    }

    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

/// `FileMatch` with owned data, so it can cross into the blocking pool.
enum OwnedMatch {
    Extensions(Vec<String>),
    Named(String),
}

impl From<FileMatch<'_>> for OwnedMatch {
    fn from(matcher: FileMatch<'_>) -> Self {
        match matcher {
            FileMatch::Extensions(extensions) => {
                OwnedMatch::Extensions(extensions.iter().map(|e| e.to_string()).collect())
            }
            FileMatch::Named(name) => OwnedMatch::Named(name.to_string()),
        }
    }
}

impl OwnedMatch {
    fn matches(&self, path: &Path) -> bool {
        match self {
            OwnedMatch::Extensions(extensions) => {
                let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();
                FileMatch::Extensions(&extensions).matches(path)
            }
            OwnedMatch::Named(name) => FileMatch::Named(name).matches(path),
        }
    }
}

fn discover_files_sync(
    root: &Path,
    matcher: &OwnedMatch,
    options: &DiscoveryOptions,
    project_root: &Path,
) -> io::Result<BTreeSet<PathBuf>> {
    let mut discovered = BTreeSet::new();

    let excluded = options.excluded_dirs.clone();
    let mut walker = WalkBuilder::new(root);
    walker
        .follow_links(options.follow_symlinks)
        .hidden(!options.include_hidden)
        .git_ignore(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .ignore(options.respect_gitignore)
        .parents(options.respect_gitignore)
        .max_depth(Some(options.max_depth))
        .max_filesize(options.max_file_size)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| excluded.iter().any(|d| d == name)))
        });

    for result in walker.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(error = %err, "Skipping unreadable entry during discovery");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        if !matcher.matches(path) {
            continue;
        }

        if let Ok(canonical) = path.canonicalize() {
            if canonical.starts_with(project_root) {
                discovered.insert(canonical);
            }
        }
    }

    Ok(discovered)
}
