//! Adapters for the four supported tools, plus the parsing helpers they share.
//!
//! Each adapter keeps its output parsers as free functions over `&str` so
//! they can be tested against captured tool output without spawning anything.

mod bun;
mod npm;
mod pnpm;
mod yarn;

pub use bun::BunAdapter;
pub use npm::NpmAdapter;
pub use pnpm::PnpmAdapter;
pub use yarn::YarnAdapter;

/// Output parsers, exposed for testing against captured samples.
pub mod parse {
    pub use super::bun::{parse_outdated as bun_outdated, parse_tree as bun_tree};
    pub use super::npm::{parse_outdated as npm_outdated, parse_tree as npm_tree};
    pub use super::pnpm::{parse_outdated as pnpm_outdated, parse_tree as pnpm_tree};
    pub use super::yarn::{parse_outdated as yarn_outdated, parse_tree as yarn_tree};
}

use depwise_core::{DependencyNode, DependencyType, OutdatedPackage, PackageManagerKind};
use serde_json::Value;

/// Split `name@version` at the last `@`. A leading `@` belongs to the scope.
pub(crate) fn split_spec(spec: &str) -> (&str, &str) {
    match spec.rfind('@') {
        Some(at) if at > 0 => (&spec[..at], &spec[at + 1..]),
        _ => (spec, ""),
    }
}

/// Log why a read operation fell back to its default.
pub(crate) fn degraded(manager: PackageManagerKind, operation: &str, reason: &dyn std::fmt::Display) {
    tracing::debug!(%manager, operation, %reason, "Unusable tool output, using default");
}

/// `(name, info)` pairs of a JSON object, or nothing.
pub(crate) fn object_entries(value: Option<&Value>) -> impl Iterator<Item = (&String, &Value)> {
    value.and_then(Value::as_object).into_iter().flatten()
}

pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

pub(crate) fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Parse the `{ "<name>": { current, wanted, latest, <type_key> } }` shape
/// that npm and pnpm share for `outdated --json`.
///
/// Missing fields chain: `current` defaults to `unknown`, `wanted` to
/// `current`, `latest` to `wanted`. npm workspaces report an array of
/// entries per package; each object in it becomes a row. Other non-object
/// values are skipped.
pub(crate) fn parse_outdated_object(
    manager: PackageManagerKind,
    stdout: &str,
    type_key: &str,
) -> Vec<OutdatedPackage> {
    if stdout.trim().is_empty() {
        return Vec::new();
    }

    let data: Value = match serde_json::from_str(stdout) {
        Ok(data) => data,
        Err(err) => {
            degraded(manager, "outdated", &err);
            return Vec::new();
        }
    };

    object_entries(Some(&data))
        .flat_map(|(name, info)| {
            let entries: Vec<&Value> = match info {
                Value::Array(per_workspace) => per_workspace.iter().collect(),
                other => vec![other],
            };
            entries
                .into_iter()
                .filter(|entry| entry.is_object())
                .map(move |entry| outdated_row(name, entry, type_key))
        })
        .collect()
}

fn outdated_row(name: &str, info: &Value, type_key: &str) -> OutdatedPackage {
    let current = str_field(info, "current").unwrap_or("unknown");
    let wanted = str_field(info, "wanted").unwrap_or(current);
    let latest = str_field(info, "latest").unwrap_or(wanted);
    let dependency_type = str_field(info, type_key)
        .and_then(DependencyType::from_tool_label)
        .unwrap_or(DependencyType::Direct);

    OutdatedPackage {
        name: name.to_string(),
        current: current.to_string(),
        wanted: wanted.to_string(),
        latest: latest.to_string(),
        dependency_type,
    }
}

/// Rebuilds a tree from entries that arrive in pre-order with a depth.
///
/// An entry becomes a child of the nearest open entry with a smaller depth,
/// or a root when there is none. Entries are attached to their parent when
/// they are closed, so sibling order is preserved.
#[derive(Debug, Default)]
pub(crate) struct DepthTreeBuilder {
    stack: Vec<(usize, DependencyNode)>,
    roots: Vec<DependencyNode>,
}

impl DepthTreeBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, depth: usize, node: DependencyNode) {
        while self.stack.last().is_some_and(|(top, _)| *top >= depth) {
            self.close_top();
        }
        self.stack.push((depth, node));
    }

    pub(crate) fn finish(mut self) -> Vec<DependencyNode> {
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.roots
    }

    fn close_top(&mut self) {
        if let Some((_, node)) = self.stack.pop() {
            match self.stack.last_mut() {
                Some((_, parent)) => parent.dependencies.push(node),
                None => self.roots.push(node),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_spec() {
        assert_eq!(split_spec("react@18.2.0"), ("react", "18.2.0"));
        assert_eq!(split_spec("@types/node@20.1.0"), ("@types/node", "20.1.0"));
        assert_eq!(split_spec("@types/node"), ("@types/node", ""));
        assert_eq!(split_spec("lodash"), ("lodash", ""));
    }

    #[test]
    fn test_depth_tree_builder_siblings_and_children() {
        let mut builder = DepthTreeBuilder::new();
        for (depth, name) in [(0, "a"), (1, "b"), (1, "c"), (0, "d")] {
            builder.push(depth, DependencyNode::new(name, "1.0.0"));
        }
        let roots = builder.finish();

        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].name, "a");
        let children: Vec<_> = roots[0].dependencies.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(children, vec!["b", "c"]);
        assert_eq!(roots[1].name, "d");
        assert!(roots[1].dependencies.is_empty());
    }

    #[test]
    fn test_depth_tree_builder_deep_then_shallow() {
        let mut builder = DepthTreeBuilder::new();
        for (depth, name) in [(0, "a"), (1, "b"), (2, "c"), (1, "d")] {
            builder.push(depth, DependencyNode::new(name, ""));
        }
        let roots = builder.finish();

        assert_eq!(roots.len(), 1);
        let a = &roots[0];
        assert_eq!(a.dependencies.len(), 2);
        assert_eq!(a.dependencies[0].dependencies[0].name, "c");
        assert_eq!(a.dependencies[1].name, "d");
    }

    proptest::proptest! {
        #[test]
        fn prop_depth_tree_keeps_preorder(steps in proptest::collection::vec(0usize..3, 0..40)) {
            // each step moves at most one level deeper than the previous entry
            let mut depths = Vec::with_capacity(steps.len());
            let mut previous = 0usize;
            for (i, step) in steps.iter().enumerate() {
                let depth = if i == 0 { 0 } else { (previous + 1).saturating_sub(*step) };
                depths.push(depth);
                previous = depth;
            }

            let mut builder = DepthTreeBuilder::new();
            for (i, depth) in depths.iter().enumerate() {
                builder.push(*depth, DependencyNode::new(format!("n{i}"), ""));
            }
            let graph = depwise_core::DependencyGraph {
                dependencies: builder.finish(),
                ..depwise_core::DependencyGraph::empty()
            };

            let names: Vec<String> = graph.nodes().map(|n| n.name.clone()).collect();
            let expected: Vec<String> = (0..depths.len()).map(|i| format!("n{i}")).collect();
            proptest::prop_assert_eq!(names, expected);
        }
    }

    #[test]
    fn test_outdated_object_defaults_chain() {
        let stdout = r#"{
            "left-pad": { "latest": "1.3.0" },
            "chalk": { "current": "4.1.0", "wanted": "4.1.2", "latest": "5.3.0", "type": "devDependencies" }
        }"#;
        let rows = parse_outdated_object(PackageManagerKind::Npm, stdout, "type");

        assert_eq!(rows[0].name, "left-pad");
        assert_eq!(rows[0].current, "unknown");
        assert_eq!(rows[0].wanted, "unknown");
        assert_eq!(rows[0].latest, "1.3.0");
        assert_eq!(rows[0].dependency_type, DependencyType::Direct);

        assert_eq!(rows[1].wanted, "4.1.2");
        assert_eq!(rows[1].dependency_type, DependencyType::Development);
    }

    #[test]
    fn test_outdated_object_workspace_arrays() {
        let stdout = r#"{
            "react": [
                { "current": "18.2.0", "wanted": "18.3.1", "latest": "19.0.0", "type": "dependencies" },
                { "current": "18.1.0", "wanted": "18.3.1", "latest": "19.0.0", "type": "devDependencies" }
            ],
            "stray": "1.0.0",
            "empty": []
        }"#;
        let rows = parse_outdated_object(PackageManagerKind::Npm, stdout, "type");

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.name == "react"));
        assert_eq!(rows[0].current, "18.2.0");
        assert_eq!(rows[1].current, "18.1.0");
        assert_eq!(rows[1].dependency_type, DependencyType::Development);
        assert!(rows.iter().all(|row| row.current != "unknown"));
    }

    #[test]
    fn test_outdated_object_bad_output() {
        assert!(parse_outdated_object(PackageManagerKind::Pnpm, "", "dependencyType").is_empty());
        assert!(parse_outdated_object(PackageManagerKind::Pnpm, "ERR!", "dependencyType").is_empty());
        assert!(parse_outdated_object(PackageManagerKind::Pnpm, "[]", "dependencyType").is_empty());
    }
}
