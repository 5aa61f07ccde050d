//! Project discovery and package manager selection.

use crate::context::AdapterContext;
use crate::factory::create_package_manager;
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::process::CommandRunner;
use crate::traits::PackageManager;
use crate::Result;
use depwise_core::{PackageManagerKind, Project};
use depwise_fs::{DiscoveryOptions, FileMatch, FileSystem};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything [`select_package_manager`] looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionSignals {
    /// The manifest's `packageManager` field, e.g. `pnpm@9.1.0`
    pub package_manager_field: Option<String>,
    /// Managers whose lockfile is present next to the manifest
    pub lockfiles: Vec<PackageManagerKind>,
    /// Fallback from configuration; `None` means auto
    pub configured_default: Option<PackageManagerKind>,
}

/// Pick the adapter for a project.
///
/// Precedence: the `packageManager` field, then the first lockfile in
/// [`PackageManagerKind::DETECTION_ORDER`], then the configured default,
/// then npm.
pub fn select_package_manager(signals: &DetectionSignals) -> PackageManagerKind {
    if let Some(field) = signals.package_manager_field.as_deref() {
        if let Some(kind) = PackageManagerKind::DETECTION_ORDER
            .into_iter()
            .find(|kind| field.starts_with(kind.binary()))
        {
            return kind;
        }
    }

    PackageManagerKind::DETECTION_ORDER
        .into_iter()
        .find(|kind| signals.lockfiles.contains(kind))
        .or(signals.configured_default)
        .unwrap_or(PackageManagerKind::Npm)
}

/// Short stable id for a project path: the first 8 hex chars of its SHA-256.
pub fn project_id(path: &Path) -> String {
    let digest = Sha256::digest(path.to_string_lossy().as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(8);
    id
}

/// Finds projects and builds their [`Project`] records.
pub struct ProjectDetector {
    fs: Arc<dyn FileSystem>,
    default_manager: Option<PackageManagerKind>,
}

impl ProjectDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            default_manager: None,
        }
    }

    /// Fallback manager when a project carries no signal of its own.
    pub fn with_default_manager(mut self, kind: Option<PackageManagerKind>) -> Self {
        self.default_manager = kind;
        self
    }

    /// Every project under `root`, skipping anything inside `node_modules`.
    pub async fn detect_projects(&self, root: &Path) -> Result<Vec<Project>> {
        let options = DiscoveryOptions {
            excluded_dirs: vec!["node_modules".to_string()],
            ..Default::default()
        };
        let manifests = self
            .fs
            .discover_files(root, FileMatch::Named(MANIFEST_FILE), &options)
            .await?;

        let mut projects = Vec::with_capacity(manifests.len());
        for manifest_path in manifests {
            if let Some(project) = self.create_project(&manifest_path).await {
                projects.push(project);
            }
        }
        tracing::debug!(root = %root.display(), count = projects.len(), "Detected projects");
        Ok(projects)
    }

    /// Build the record for one manifest. Unreadable manifests are skipped
    /// with a warning.
    pub async fn create_project(&self, manifest_path: &Path) -> Option<Project> {
        let manifest = match Manifest::load(self.fs.as_ref(), manifest_path).await {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::warn!(path = %manifest_path.display(), error = %err, "Skipping project");
                return None;
            }
        };

        let dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let signals = self.signals(&manifest, &dir).await;
        let kind = select_package_manager(&signals);

        let lockfile = dir.join(kind.lockfile_name());
        let lockfile_path = signals.lockfiles.contains(&kind).then_some(lockfile);

        let name = manifest
            .name()
            .map(String::from)
            .or_else(|| {
                dir.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "root".to_string());

        Some(Project {
            id: project_id(&dir),
            name,
            path: dir,
            manifest_path: manifest_path.to_path_buf(),
            package_manager: kind,
            lockfile_path,
            packages: Vec::new(),
            last_updated: chrono::Utc::now(),
            has_security_issues: false,
            has_updates: false,
        })
    }

    /// Gather the selection signals for the project in `dir`.
    pub async fn signals(&self, manifest: &Manifest, dir: &Path) -> DetectionSignals {
        let mut lockfiles = Vec::new();
        for kind in PackageManagerKind::DETECTION_ORDER {
            let path = dir.join(kind.lockfile_name());
            if self.fs.exists(&path).await.unwrap_or(false) {
                lockfiles.push(kind);
            }
        }

        DetectionSignals {
            package_manager_field: manifest.package_manager_field().map(String::from),
            lockfiles,
            configured_default: self.default_manager,
        }
    }
}

/// Turns [`Project`] records into live adapters and fresh snapshots.
pub struct ProjectService {
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
}

impl ProjectService {
    pub fn new(fs: Arc<dyn FileSystem>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { fs, runner }
    }

    pub fn context_for(&self, project_root: impl Into<PathBuf>) -> AdapterContext {
        AdapterContext::new(project_root, Arc::clone(&self.fs), Arc::clone(&self.runner))
    }

    /// The adapter for a detected project.
    pub fn package_manager(&self, project: &Project) -> Box<dyn PackageManager> {
        create_package_manager(project.package_manager, self.context_for(&project.path))
    }

    /// A new snapshot of `project` with its declared packages listed.
    ///
    /// A manifest that cannot be listed yields an empty package list.
    pub async fn refresh(&self, project: &Project) -> Project {
        let packages = match self.package_manager(project).list().await {
            Ok(packages) => packages,
            Err(err) => {
                tracing::warn!(project = %project.name, error = %err, "Failed to list packages");
                Vec::new()
            }
        };

        Project {
            has_updates: packages.iter().any(|p| p.has_update()),
            has_security_issues: packages.iter().any(|p| p.has_vulnerabilities()),
            packages,
            last_updated: chrono::Utc::now(),
            ..project.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(field: Option<&str>, lockfiles: &[PackageManagerKind]) -> DetectionSignals {
        DetectionSignals {
            package_manager_field: field.map(String::from),
            lockfiles: lockfiles.to_vec(),
            configured_default: None,
        }
    }

    #[test]
    fn test_package_manager_field_wins() {
        let s = signals(Some("pnpm@9.1.0"), &[PackageManagerKind::Yarn]);
        assert_eq!(select_package_manager(&s), PackageManagerKind::Pnpm);

        let s = signals(Some("yarn@1.22.19"), &[]);
        assert_eq!(select_package_manager(&s), PackageManagerKind::Yarn);
    }

    #[test]
    fn test_unknown_field_falls_through_to_lockfiles() {
        let s = signals(Some("deno@1.0.0"), &[PackageManagerKind::Npm, PackageManagerKind::Bun]);
        assert_eq!(select_package_manager(&s), PackageManagerKind::Bun);
    }

    #[test]
    fn test_lockfile_order() {
        let s = signals(None, &[PackageManagerKind::Npm, PackageManagerKind::Yarn]);
        assert_eq!(select_package_manager(&s), PackageManagerKind::Yarn);
    }

    #[test]
    fn test_configured_default_then_npm() {
        let mut s = signals(None, &[]);
        assert_eq!(select_package_manager(&s), PackageManagerKind::Npm);

        s.configured_default = Some(PackageManagerKind::Pnpm);
        assert_eq!(select_package_manager(&s), PackageManagerKind::Pnpm);
    }

    #[test]
    fn test_project_id_is_stable_and_short() {
        let a = project_id(Path::new("/work/app"));
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, project_id(Path::new("/work/app")));
        assert_ne!(a, project_id(Path::new("/work/api")));
    }
}
