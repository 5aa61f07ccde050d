//! FileSystem trait for project-scoped filesystem operations.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// Directories never descended into during discovery unless overridden.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build"];

/// Options for file discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Directory names pruned wherever they appear in the tree.
    pub excluded_dirs: Vec<String>,

    /// Maximum file size to include (bytes).
    pub max_file_size: Option<u64>,

    /// Follow symbolic links (default: false).
    pub follow_symlinks: bool,

    /// Maximum directory depth (default: 100).
    pub max_depth: usize,

    /// Include hidden files (default: false).
    pub include_hidden: bool,

    /// Respect .gitignore files (default: false; the scan is purely structural).
    pub respect_gitignore: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            max_file_size: Some(10 * 1024 * 1024),
            follow_symlinks: false,
            max_depth: 100,
            include_hidden: false,
            respect_gitignore: false,
        }
    }
}

impl DiscoveryOptions {
    /// Whether a directory name is pruned.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }
}

/// What a discovery walk collects.
#[derive(Debug, Clone, Copy)]
pub enum FileMatch<'a> {
    /// Files whose extension (with leading dot, e.g. `.ts`) is in the list
    Extensions(&'a [&'a str]),
    /// Files with exactly this file name (e.g. `package.json`)
    Named(&'a str),
}

impl FileMatch<'_> {
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            FileMatch::Extensions(extensions) => path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e.strip_prefix('.') == Some(ext))),
            FileMatch::Named(name) => path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n == *name),
        }
    }
}

/// Project-scoped filesystem abstraction.
///
/// All methods are async so callers are agnostic to where the bytes live:
/// - **Native**: blocking I/O is offloaded via `tokio::task::spawn_blocking`
/// - **Memory**: operations complete immediately against an in-memory map
///
/// Relative paths resolve against [`FileSystem::project_root`]. Paths that
/// escape the root fail with `io::ErrorKind::PermissionDenied`.
#[async_trait::async_trait]
pub trait FileSystem: Send + Sync {
    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Read file contents as a string.
    ///
    /// # Errors
    ///
    /// Returns `io::ErrorKind::NotFound` if the file doesn't exist.
    /// Returns `io::ErrorKind::InvalidData` if the file is not valid UTF-8.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string contents to a file, replacing it if present.
    ///
    /// Parent directories are NOT created automatically.
    async fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Remove a file.
    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Rename a file. Used for write-to-temp-then-rename updates.
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Walk `root` and collect matching files, pruning excluded directories.
    ///
    /// Returns absolute paths in sorted order.
    async fn discover_files(
        &self,
        root: &Path,
        matcher: FileMatch<'_>,
        options: &DiscoveryOptions,
    ) -> io::Result<BTreeSet<PathBuf>>;

    /// The root this filesystem is scoped to.
    fn project_root(&self) -> &Path;
}
