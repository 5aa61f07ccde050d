//! The operation set every package manager adapter implements.

use crate::context::AdapterContext;
use crate::manifest::Manifest;
use crate::process::ProcessOutput;
use crate::Result;
use depwise_core::{
    DependencyGraph, DependencyType, InstalledPackage, OutdatedPackage, PackageManagerKind,
};

/// Flags for [`PackageManager::install`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Save into `devDependencies`
    pub dev: bool,
    /// Pin the exact version instead of a caret range
    pub exact: bool,
}

/// One external package manager tool.
///
/// Mutating operations return the tool's output as-is; a non-zero exit is
/// for the caller to inspect. Read operations never fail on bad tool output:
/// they degrade to an empty list or [`DependencyGraph::empty`]. The only
/// error a tool-backed operation returns is a failure to spawn the tool.
#[async_trait::async_trait]
pub trait PackageManager: Send + Sync {
    /// Which tool this adapter drives
    fn kind(&self) -> PackageManagerKind;

    fn context(&self) -> &AdapterContext;

    async fn install(&self, packages: &[String], options: InstallOptions) -> Result<ProcessOutput>;

    async fn uninstall(&self, packages: &[String]) -> Result<ProcessOutput>;

    /// Update the given packages, or everything when `packages` is empty.
    async fn update(&self, packages: &[String]) -> Result<ProcessOutput>;

    async fn outdated(&self) -> Result<Vec<OutdatedPackage>>;

    /// The installed tree as reported by the tool.
    async fn dependency_tree(&self) -> Result<DependencyGraph>;

    /// # Errors
    /// `Unsupported` for tools without an audit autofix.
    async fn audit_fix(&self) -> Result<ProcessOutput>;

    /// Declared dependencies, read straight from the manifest.
    ///
    /// # Errors
    /// Returns an error if the manifest is missing or unreadable.
    async fn list(&self) -> Result<Vec<InstalledPackage>> {
        let ctx = self.context();
        let manifest = Manifest::load(ctx.fs.as_ref(), &ctx.manifest_path()).await?;
        Ok(manifest.installed_packages())
    }

    /// Move a declared dependency between buckets and write the manifest.
    ///
    /// # Errors
    /// `BucketNotFound` or `PackageNotFound` when there is nothing to move.
    async fn move_dependency(
        &self,
        name: &str,
        from: DependencyType,
        to: DependencyType,
    ) -> Result<()> {
        let ctx = self.context();
        let mut manifest = Manifest::load(ctx.fs.as_ref(), &ctx.manifest_path()).await?;
        manifest.move_dependency(name, from, to)?;
        tracing::info!(package = %name, %from, %to, "Moving dependency");
        manifest.save(ctx.fs.as_ref()).await
    }
}
