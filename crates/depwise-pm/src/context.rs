//! Shared state handed to every adapter.

use crate::manifest::MANIFEST_FILE;
use crate::process::{CommandRunner, ProcessOutput};
use crate::Result;
use depwise_fs::FileSystem;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where an adapter runs and what it runs with.
#[derive(Clone)]
pub struct AdapterContext {
    pub project_root: PathBuf,
    pub fs: Arc<dyn FileSystem>,
    pub runner: Arc<dyn CommandRunner>,
}

impl AdapterContext {
    pub fn new(
        project_root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            fs,
            runner,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// `<project_root>/package.json`
    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(MANIFEST_FILE)
    }

    /// Run `program args...` in the project root.
    pub async fn run<I, S>(&self, program: &str, args: I) -> Result<ProcessOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.runner.run(program, &args, &self.project_root).await
    }
}

impl fmt::Debug for AdapterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterContext")
            .field("project_root", &self.project_root)
            .finish_non_exhaustive()
    }
}
