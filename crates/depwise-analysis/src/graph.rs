//! Dependency graph generation.

use crate::Result;
use depwise_core::DependencyGraph;
use depwise_pm::PackageManager;

/// Produces the canonical graph of a project through its adapter.
pub struct GraphBuilder<'a> {
    package_manager: &'a dyn PackageManager,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(package_manager: &'a dyn PackageManager) -> Self {
        Self { package_manager }
    }

    /// The installed tree, in the same shape whichever tool produced it.
    pub async fn generate(&self) -> Result<DependencyGraph> {
        let graph = self.package_manager.dependency_tree().await?;
        tracing::debug!(
            manager = %self.package_manager.kind(),
            nodes = graph.node_count(),
            "Generated dependency graph"
        );
        Ok(graph)
    }
}
