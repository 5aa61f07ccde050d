//! Resolves the project, config and collaborators a command runs against.

use crate::GlobalArgs;
use anyhow::{anyhow, Context, Result};
use depwise_config::{ConfigManager, DepwiseConfig};
use depwise_core::Project;
use depwise_fs::{FileSystem, NativeFileSystem};
use depwise_pm::{
    CommandRunner, PackageManager, ProjectDetector, ProjectService, TokioCommandRunner,
    MANIFEST_FILE,
};
use depwise_registry::RegistryClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load the config named by `--config`, the default file, or the defaults.
pub async fn load_config(global: &GlobalArgs) -> Result<DepwiseConfig> {
    let path = match &global.config {
        Some(path) => path.clone(),
        None => match ConfigManager::config_path() {
            Ok(path) => path,
            Err(err) => {
                tracing::debug!(error = %err, "No home directory, using default config");
                return Ok(DepwiseConfig::default());
            }
        },
    };
    ConfigManager::load_or_default(&path)
        .await
        .with_context(|| format!("Failed to read config at {}", path.display()))
}

/// Registry client honoring the config and `--offline`.
pub fn registry_client(config: &DepwiseConfig, global: &GlobalArgs) -> Result<RegistryClient> {
    let mut options = config.registry_options();
    options.offline |= global.offline;
    RegistryClient::new(options).context("Failed to create registry client")
}

/// `--path`, made absolute and canonical.
pub fn project_root(global: &GlobalArgs) -> Result<PathBuf> {
    global
        .path
        .canonicalize()
        .with_context(|| format!("Project directory not found: {}", global.path.display()))
}

/// Everything a single-project command needs.
pub struct Session {
    pub config: DepwiseConfig,
    pub project: Project,
    pub runner: Arc<dyn CommandRunner>,
    pub registry: Arc<RegistryClient>,
    pub json: bool,
    service: ProjectService,
}

impl Session {
    pub async fn open(global: &GlobalArgs) -> Result<Self> {
        let config = load_config(global).await?;
        let root = project_root(global)?;

        let fs: Arc<dyn FileSystem> = Arc::new(
            NativeFileSystem::new(&root)
                .with_context(|| format!("Cannot open project at {}", root.display()))?,
        );
        let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner::new());

        let detector = ProjectDetector::new(Arc::clone(&fs))
            .with_default_manager(config.default_package_manager.kind());
        let mut project = detector
            .create_project(&root.join(MANIFEST_FILE))
            .await
            .ok_or_else(|| anyhow!("No readable {MANIFEST_FILE} in {}", root.display()))?;

        if let Some(kind) = global.manager {
            project.package_manager = kind;
            project.lockfile_path = lockfile_if_present(&root, kind.lockfile_name());
        }
        tracing::info!(
            project = %project.name,
            manager = %project.package_manager,
            "Opened project"
        );

        let registry = Arc::new(registry_client(&config, global)?);
        let service = ProjectService::new(Arc::clone(&fs), Arc::clone(&runner));

        Ok(Self {
            config,
            project,
            runner,
            registry,
            json: global.json,
            service,
        })
    }

    /// The adapter for the session's project.
    pub fn package_manager(&self) -> Box<dyn PackageManager> {
        self.service.package_manager(&self.project)
    }

    /// The project with its declared packages listed.
    pub async fn refreshed_project(&self) -> Project {
        self.service.refresh(&self.project).await
    }
}

fn lockfile_if_present(root: &Path, name: &str) -> Option<PathBuf> {
    let path = root.join(name);
    path.is_file().then_some(path)
}
