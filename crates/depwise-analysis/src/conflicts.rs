//! Conflict detection over a dependency graph.

use crate::graph::GraphBuilder;
use crate::Result;
use depwise_core::{Conflict, ConflictKind, DependencyGraph};
use depwise_pm::PackageManager;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Result of walking a graph: reported conflicts plus every version seen
/// per package name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
    pub versions: BTreeMap<String, BTreeSet<String>>,
}

impl ConflictReport {
    /// Packages present in more than one version. Informational only; this
    /// is normal in an npm tree and is never reported as a conflict.
    pub fn duplicated(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.versions
            .iter()
            .filter(|(_, versions)| versions.len() > 1)
            .map(|(name, versions)| (name.as_str(), versions))
    }
}

/// Walk `graph` and report one `invalid` conflict per node that carries a
/// tool-reported error.
pub fn find_conflicts(graph: &DependencyGraph) -> ConflictReport {
    let mut report = ConflictReport::default();

    for node in graph.nodes() {
        if let Some(error) = node.error.as_deref().filter(|e| !e.is_empty()) {
            report.conflicts.push(Conflict {
                package_name: node.name.clone(),
                kind: ConflictKind::Invalid,
                message: error.to_string(),
                location: Some(node.name.clone()),
            });
        }

        report
            .versions
            .entry(node.name.clone())
            .or_default()
            .insert(node.version.clone());
    }

    report
}

/// Runs [`find_conflicts`] on a project's freshly generated graph.
pub struct ConflictDetector<'a> {
    package_manager: &'a dyn PackageManager,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(package_manager: &'a dyn PackageManager) -> Self {
        Self { package_manager }
    }

    pub async fn detect_conflicts(&self) -> Result<Vec<Conflict>> {
        Ok(self.report().await?.conflicts)
    }

    /// Conflicts together with the per-package version sets.
    pub async fn report(&self) -> Result<ConflictReport> {
        let graph = GraphBuilder::new(self.package_manager).generate().await?;
        Ok(find_conflicts(&graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depwise_core::DependencyNode;

    fn graph(dependencies: Vec<DependencyNode>) -> DependencyGraph {
        DependencyGraph {
            dependencies,
            ..DependencyGraph::empty()
        }
    }

    #[test]
    fn test_one_error_one_conflict() {
        let g = graph(vec![
            DependencyNode::new("react", "18.2.0").with_dependencies(vec![
                DependencyNode::new("loose-envify", "1.4.0"),
                DependencyNode::new("scheduler", "").with_error("missing: required ^0.23.0"),
            ]),
            DependencyNode::new("zod", "3.22.4"),
        ]);
        let report = find_conflicts(&g);

        assert_eq!(
            report.conflicts,
            vec![Conflict {
                package_name: "scheduler".to_string(),
                kind: ConflictKind::Invalid,
                message: "missing: required ^0.23.0".to_string(),
                location: Some("scheduler".to_string()),
            }]
        );
    }

    #[test]
    fn test_clean_graph_has_no_conflicts() {
        let g = graph(vec![DependencyNode::new("a", "1.0.0")]);
        assert!(find_conflicts(&g).conflicts.is_empty());
        assert!(find_conflicts(&DependencyGraph::empty()).conflicts.is_empty());
    }

    #[test]
    fn test_duplicate_versions_are_tracked_not_flagged() {
        let g = graph(vec![
            DependencyNode::new("a", "1.0.0")
                .with_dependencies(vec![DependencyNode::new("ms", "2.0.0")]),
            DependencyNode::new("b", "1.0.0")
                .with_dependencies(vec![DependencyNode::new("ms", "2.1.3")]),
            DependencyNode::new("ms", "2.1.3"),
        ]);
        let report = find_conflicts(&g);

        assert!(report.conflicts.is_empty());
        let duplicated: Vec<_> = report.duplicated().collect();
        assert_eq!(duplicated.len(), 1);
        assert_eq!(duplicated[0].0, "ms");
        assert_eq!(
            duplicated[0].1.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["2.0.0", "2.1.3"]
        );
    }
}
