//! yarn (classic) adapter.
//!
//! yarn prints JSON lines: each line is a record with a `type` tag, and only
//! the `table` (outdated) or `tree` (list) records carry data.

use super::{degraded, split_spec, str_field};
use crate::context::AdapterContext;
use crate::process::ProcessOutput;
use crate::traits::{InstallOptions, PackageManager};
use crate::Result;
use depwise_core::{
    DependencyGraph, DependencyNode, DependencyType, OutdatedPackage, PackageManagerKind,
};
use serde_json::Value;

const KIND: PackageManagerKind = PackageManagerKind::Yarn;

/// Column of the dependency type in the outdated table when there is no header.
const PACKAGE_TYPE_COLUMN: usize = 4;

/// Drives the `yarn` CLI.
#[derive(Debug, Clone)]
pub struct YarnAdapter {
    ctx: AdapterContext,
}

impl YarnAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        Self { ctx }
    }

    pub fn install_args(packages: &[String], options: InstallOptions) -> Vec<String> {
        let mut args = vec!["add".to_string()];
        if options.dev {
            args.push("--dev".to_string());
        }
        if options.exact {
            args.push("--exact".to_string());
        }
        args.extend(packages.iter().cloned());
        args
    }
}

#[async_trait::async_trait]
impl PackageManager for YarnAdapter {
    fn kind(&self) -> PackageManagerKind {
        KIND
    }

    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    async fn install(&self, packages: &[String], options: InstallOptions) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Installing");
        self.ctx.run("yarn", Self::install_args(packages, options)).await
    }

    async fn uninstall(&self, packages: &[String]) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Uninstalling");
        let args = std::iter::once("remove".to_string()).chain(packages.iter().cloned());
        self.ctx.run("yarn", args).await
    }

    async fn update(&self, packages: &[String]) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Upgrading");
        let args = std::iter::once("upgrade".to_string()).chain(packages.iter().cloned());
        self.ctx.run("yarn", args).await
    }

    async fn outdated(&self) -> Result<Vec<OutdatedPackage>> {
        let output = self.ctx.run("yarn", ["outdated", "--json"]).await?;
        Ok(parse_outdated(&output.stdout))
    }

    async fn dependency_tree(&self) -> Result<DependencyGraph> {
        let output = self.ctx.run("yarn", ["list", "--json"]).await?;
        Ok(parse_tree(&output.stdout))
    }

    async fn audit_fix(&self) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, "Running audit fix");
        self.ctx.run("yarn", ["audit", "fix"]).await
    }
}

/// JSON records of the given `type`, skipping lines that do not parse.
fn records<'a>(stdout: &'a str, record_type: &'a str) -> impl Iterator<Item = Value> + 'a {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(move |record| str_field(record, "type") == Some(record_type))
}

/// Parse `yarn outdated --json`.
pub fn parse_outdated(stdout: &str) -> Vec<OutdatedPackage> {
    let mut packages = Vec::new();

    for table in records(stdout, "table") {
        let Some(data) = table.get("data") else {
            continue;
        };
        let type_column = data
            .get("head")
            .and_then(Value::as_array)
            .and_then(|head| head.iter().position(|h| h.as_str() == Some("Package Type")))
            .unwrap_or(PACKAGE_TYPE_COLUMN);

        let rows = data.get("body").and_then(Value::as_array).into_iter().flatten();
        for row in rows {
            let Some(cells) = row.as_array() else {
                continue;
            };
            let cell = |i: usize| cells.get(i).and_then(Value::as_str);
            let (Some(name), Some(current), Some(wanted), Some(latest)) =
                (cell(0), cell(1), cell(2), cell(3))
            else {
                continue;
            };

            packages.push(OutdatedPackage {
                name: name.to_string(),
                current: current.to_string(),
                wanted: wanted.to_string(),
                latest: latest.to_string(),
                dependency_type: cell(type_column)
                    .and_then(DependencyType::from_tool_label)
                    .unwrap_or(DependencyType::Direct),
            });
        }
    }

    packages
}

/// Parse `yarn list --json`.
pub fn parse_tree(stdout: &str) -> DependencyGraph {
    let Some(tree) = records(stdout, "tree").next() else {
        if !stdout.trim().is_empty() {
            degraded(KIND, "dependency tree", &"no tree record");
        }
        return DependencyGraph::empty();
    };

    let dependencies = tree
        .get("data")
        .and_then(|data| data.get("trees"))
        .and_then(Value::as_array)
        .map(|trees| trees.iter().filter_map(convert_node).collect())
        .unwrap_or_default();

    DependencyGraph {
        dependencies,
        ..DependencyGraph::empty()
    }
}

fn convert_node(node: &Value) -> Option<DependencyNode> {
    let (name, version) = split_spec(str_field(node, "name")?);
    let children = node
        .get("children")
        .and_then(Value::as_array)
        .map(|children| children.iter().filter_map(convert_node).collect())
        .unwrap_or_default();
    Some(DependencyNode::new(name, version).with_dependencies(children))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outdated_reads_package_type_column() {
        let stdout = concat!(
            r#"{"type":"info","data":"Color legend : \n \"<red>\"    : Major Update backward-incompatible updates"}"#,
            "\n",
            r#"{"type":"table","data":{"head":["Package","Current","Wanted","Latest","Package Type","URL"],"body":[["jest","29.6.0","29.7.0","29.7.0","devDependencies","https://jestjs.io/"],["lodash","4.17.20","4.17.21","4.17.21","dependencies","https://lodash.com/"]]}}"#,
            "\n",
        );
        let rows = parse_outdated(stdout);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "jest");
        assert_eq!(rows[0].wanted, "29.7.0");
        assert_eq!(rows[0].dependency_type, DependencyType::Development);
        assert_eq!(rows[1].name, "lodash");
        assert_eq!(rows[1].dependency_type, DependencyType::Direct);
    }

    #[test]
    fn test_parse_outdated_without_head_uses_fifth_column() {
        let stdout = r#"{"type":"table","data":{"body":[["ts-node","10.0.0","10.9.2","10.9.2","optionalDependencies","x"],["short","1.0.0"]]}}"#;
        let rows = parse_outdated(stdout);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dependency_type, DependencyType::Optional);
    }

    #[test]
    fn test_parse_outdated_skips_garbage_lines() {
        let stdout = "warning something\n{not json\n";
        assert!(parse_outdated(stdout).is_empty());
    }

    #[test]
    fn test_parse_tree() {
        let stdout = concat!(
            r#"{"type":"activityStart","data":{"id":0}}"#,
            "\n",
            r#"{"type":"tree","data":{"type":"list","trees":[{"name":"@babel/core@7.24.0","children":[{"name":"@babel/types@7.24.0","color":"dim","shadow":true}],"hint":null,"color":"bold","depth":0},{"name":"chalk@4.1.2","children":[],"hint":null,"depth":0}]}}"#,
            "\n",
        );
        let graph = parse_tree(stdout);

        assert_eq!(graph.name, "root");
        assert_eq!(graph.version, "0.0.0");
        assert_eq!(graph.dependencies.len(), 2);
        assert_eq!(graph.dependencies[0].name, "@babel/core");
        assert_eq!(graph.dependencies[0].version, "7.24.0");
        assert_eq!(graph.dependencies[0].dependencies[0].spec(), "@babel/types@7.24.0");
        assert_eq!(graph.dependencies[1].spec(), "chalk@4.1.2");
    }

    #[test]
    fn test_parse_tree_without_tree_record() {
        let stdout = r#"{"type":"error","data":"An unexpected error occurred"}"#;
        assert_eq!(parse_tree(stdout), DependencyGraph::empty());
        assert_eq!(parse_tree(""), DependencyGraph::empty());
    }

    #[test]
    fn test_install_args() {
        let pkgs = vec!["jest".to_string()];
        assert_eq!(
            YarnAdapter::install_args(&pkgs, InstallOptions { dev: true, exact: true }),
            vec!["add", "--dev", "--exact", "jest"]
        );
    }
}
