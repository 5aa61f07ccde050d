//! npm adapter.

use super::{bool_field, degraded, object_entries, parse_outdated_object, str_field};
use crate::context::AdapterContext;
use crate::process::ProcessOutput;
use crate::traits::{InstallOptions, PackageManager};
use crate::Result;
use depwise_core::{DependencyGraph, DependencyNode, OutdatedPackage, PackageManagerKind};
use serde_json::Value;

const KIND: PackageManagerKind = PackageManagerKind::Npm;

/// Drives the `npm` CLI.
#[derive(Debug, Clone)]
pub struct NpmAdapter {
    ctx: AdapterContext,
}

impl NpmAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        Self { ctx }
    }

    pub fn install_args(packages: &[String], options: InstallOptions) -> Vec<String> {
        let mut args = vec!["install".to_string()];
        if options.dev {
            args.push("--save-dev".to_string());
        }
        if options.exact {
            args.push("--save-exact".to_string());
        }
        args.extend(packages.iter().cloned());
        args
    }
}

#[async_trait::async_trait]
impl PackageManager for NpmAdapter {
    fn kind(&self) -> PackageManagerKind {
        KIND
    }

    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    async fn install(&self, packages: &[String], options: InstallOptions) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Installing");
        self.ctx.run("npm", Self::install_args(packages, options)).await
    }

    async fn uninstall(&self, packages: &[String]) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Uninstalling");
        let args = std::iter::once("uninstall".to_string()).chain(packages.iter().cloned());
        self.ctx.run("npm", args).await
    }

    async fn update(&self, packages: &[String]) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Updating");
        let args = std::iter::once("update".to_string()).chain(packages.iter().cloned());
        self.ctx.run("npm", args).await
    }

    async fn outdated(&self) -> Result<Vec<OutdatedPackage>> {
        // exits 1 whenever something is outdated
        let output = self.ctx.run("npm", ["outdated", "--json"]).await?;
        Ok(parse_outdated(&output.stdout))
    }

    async fn dependency_tree(&self) -> Result<DependencyGraph> {
        // exits non-zero on unmet peers but still prints the tree
        let output = self.ctx.run("npm", ["ls", "--all", "--json"]).await?;
        Ok(parse_tree(&output.stdout))
    }

    async fn audit_fix(&self) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, "Running audit fix");
        self.ctx.run("npm", ["audit", "fix"]).await
    }
}

/// Parse `npm outdated --json`.
pub fn parse_outdated(stdout: &str) -> Vec<OutdatedPackage> {
    parse_outdated_object(KIND, stdout, "type")
}

/// Parse `npm ls --all --json`.
pub fn parse_tree(stdout: &str) -> DependencyGraph {
    if stdout.trim().is_empty() {
        return DependencyGraph::empty();
    }

    let data: Value = match serde_json::from_str(stdout) {
        Ok(data) => data,
        Err(err) => {
            degraded(KIND, "dependency tree", &err);
            return DependencyGraph::empty();
        }
    };
    if !data.is_object() {
        degraded(KIND, "dependency tree", &"top level is not an object");
        return DependencyGraph::empty();
    }

    DependencyGraph {
        name: str_field(&data, "name").unwrap_or("root").to_string(),
        version: str_field(&data, "version").unwrap_or("0.0.0").to_string(),
        dependencies: object_entries(data.get("dependencies"))
            .map(|(name, info)| convert_node(name, info))
            .collect(),
    }
}

fn convert_node(name: &str, info: &Value) -> DependencyNode {
    let mut node = DependencyNode::new(name, str_field(info, "version").unwrap_or(""))
        .with_dependencies(
            object_entries(info.get("dependencies"))
                .map(|(child, child_info)| convert_node(child, child_info))
                .collect(),
        );
    node.error = node_problem(info);
    node.dev = bool_field(info, "dev");
    node.optional = bool_field(info, "optional");
    node.peer = bool_field(info, "peer");
    node
}

/// The problem npm reports for a node: its `problems` list, else a
/// `missing` or `invalid` marker.
fn node_problem(info: &Value) -> Option<String> {
    let problems: Vec<&str> = info
        .get("problems")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if !problems.is_empty() {
        return Some(problems.join("; "));
    }

    if bool_field(info, "missing") {
        return Some(match str_field(info, "required") {
            Some(required) => format!("missing: required {required}"),
            None => "missing".to_string(),
        });
    }

    match info.get("invalid") {
        Some(Value::String(reason)) if !reason.is_empty() => Some(format!("invalid: {reason}")),
        Some(Value::Bool(true)) => Some("invalid".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depwise_core::DependencyType;

    const LS_OUTPUT: &str = r#"{
  "version": "1.0.0",
  "name": "shop",
  "problems": ["invalid: react-dom@17.0.2 /shop/node_modules/react-dom"],
  "dependencies": {
    "react": {
      "version": "18.2.0",
      "resolved": "https://registry.npmjs.org/react/-/react-18.2.0.tgz",
      "overridden": false,
      "dependencies": {
        "loose-envify": { "version": "1.4.0" }
      }
    },
    "react-dom": {
      "version": "17.0.2",
      "invalid": "\"^18.2.0\" from the root project",
      "problems": ["invalid: react-dom@17.0.2 /shop/node_modules/react-dom"]
    },
    "left-pad": { "required": "^1.3.0", "missing": true },
    "local-lib": { "version": "file:../local-lib", "dev": true }
  }
}"#;

    #[test]
    fn test_parse_tree() {
        let graph = parse_tree(LS_OUTPUT);
        assert_eq!(graph.name, "shop");
        assert_eq!(graph.version, "1.0.0");
        assert_eq!(graph.dependencies.len(), 4);

        let react = &graph.dependencies[0];
        assert_eq!(react.spec(), "react@18.2.0");
        assert_eq!(react.dependencies[0].spec(), "loose-envify@1.4.0");
        assert!(react.error.is_none());

        let react_dom = &graph.dependencies[1];
        assert_eq!(
            react_dom.error.as_deref(),
            Some("invalid: react-dom@17.0.2 /shop/node_modules/react-dom")
        );

        let left_pad = &graph.dependencies[2];
        assert_eq!(left_pad.version, "");
        assert_eq!(left_pad.error.as_deref(), Some("missing: required ^1.3.0"));

        let local = &graph.dependencies[3];
        assert_eq!(local.version, "");
        assert!(local.dev);
    }

    #[test]
    fn test_invalid_marker_without_problems() {
        let graph = parse_tree(r#"{ "dependencies": { "a": { "version": "1.0.0", "invalid": true } } }"#);
        assert_eq!(graph.name, "root");
        assert_eq!(graph.version, "0.0.0");
        assert_eq!(graph.dependencies[0].error.as_deref(), Some("invalid"));
    }

    #[test]
    fn test_parse_tree_degrades() {
        assert_eq!(parse_tree(""), DependencyGraph::empty());
        assert_eq!(parse_tree("npm ERR! code ELSPROBLEMS"), DependencyGraph::empty());
        assert_eq!(parse_tree("[1]"), DependencyGraph::empty());
    }

    #[test]
    fn test_parse_outdated() {
        let stdout = r#"{
  "typescript": {
    "current": "5.3.3",
    "wanted": "5.3.3",
    "latest": "5.4.5",
    "dependent": "shop",
    "location": "/shop/node_modules/typescript",
    "type": "devDependencies"
  }
}"#;
        let rows = parse_outdated(stdout);
        assert_eq!(
            rows,
            vec![OutdatedPackage {
                name: "typescript".to_string(),
                current: "5.3.3".to_string(),
                wanted: "5.3.3".to_string(),
                latest: "5.4.5".to_string(),
                dependency_type: DependencyType::Development,
            }]
        );
    }

    #[test]
    fn test_install_args() {
        let pkgs = vec!["react".to_string()];
        assert_eq!(
            NpmAdapter::install_args(&pkgs, InstallOptions { dev: true, exact: true }),
            vec!["install", "--save-dev", "--save-exact", "react"]
        );
        assert_eq!(
            NpmAdapter::install_args(&pkgs, InstallOptions::default()),
            vec!["install", "react"]
        );
    }
}
