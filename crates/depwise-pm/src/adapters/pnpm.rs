//! pnpm adapter.

use super::{degraded, object_entries, parse_outdated_object, str_field};
use crate::context::AdapterContext;
use crate::process::ProcessOutput;
use crate::traits::{InstallOptions, PackageManager};
use crate::Result;
use depwise_core::{DependencyGraph, DependencyNode, OutdatedPackage, PackageManagerKind};
use serde_json::Value;

const KIND: PackageManagerKind = PackageManagerKind::Pnpm;

/// Drives the `pnpm` CLI.
#[derive(Debug, Clone)]
pub struct PnpmAdapter {
    ctx: AdapterContext,
}

impl PnpmAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        Self { ctx }
    }

    pub fn install_args(packages: &[String], options: InstallOptions) -> Vec<String> {
        let mut args = vec!["add".to_string()];
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
impl PackageManager for PnpmAdapter {
    fn kind(&self) -> PackageManagerKind {
        KIND
    }

    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    async fn install(&self, packages: &[String], options: InstallOptions) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Installing");
        self.ctx.run("pnpm", Self::install_args(packages, options)).await
    }

    async fn uninstall(&self, packages: &[String]) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Uninstalling");
        let args = std::iter::once("remove".to_string()).chain(packages.iter().cloned());
        self.ctx.run("pnpm", args).await
    }

    async fn update(&self, packages: &[String]) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Updating");
        let args = std::iter::once("update".to_string()).chain(packages.iter().cloned());
        self.ctx.run("pnpm", args).await
    }

    async fn outdated(&self) -> Result<Vec<OutdatedPackage>> {
        let output = self.ctx.run("pnpm", ["outdated", "--json"]).await?;
        Ok(parse_outdated(&output.stdout))
    }

    async fn dependency_tree(&self) -> Result<DependencyGraph> {
        let output = self
            .ctx
            .run("pnpm", ["list", "--depth", "Infinity", "--json"])
            .await?;
        Ok(parse_tree(&output.stdout))
    }

    async fn audit_fix(&self) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, "Running audit fix");
        self.ctx.run("pnpm", ["audit", "--fix"]).await
    }
}

/// Parse `pnpm outdated --json`.
pub fn parse_outdated(stdout: &str) -> Vec<OutdatedPackage> {
    parse_outdated_object(KIND, stdout, "dependencyType")
}

/// Parse `pnpm list --depth Infinity --json`.
///
/// pnpm prints one entry per workspace project; only the first is used.
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

    let project = match &data {
        Value::Array(projects) => projects.first(),
        Value::Object(_) => Some(&data),
        _ => None,
    };
    let Some(project) = project.filter(|p| p.is_object()) else {
        degraded(KIND, "dependency tree", &"no project in output");
        return DependencyGraph::empty();
    };

    let mut dependencies = Vec::new();
    for (section, dev, optional) in [
        ("dependencies", false, false),
        ("devDependencies", true, false),
        ("optionalDependencies", false, true),
    ] {
        dependencies.extend(object_entries(project.get(section)).map(|(name, info)| {
            let mut node = convert_node(name, info);
            node.dev = dev;
            node.optional = optional;
            node
        }));
    }

    DependencyGraph {
        name: str_field(project, "name").unwrap_or("root").to_string(),
        version: str_field(project, "version").unwrap_or("0.0.0").to_string(),
        dependencies,
    }
}

fn convert_node(name: &str, info: &Value) -> DependencyNode {
    DependencyNode::new(name, str_field(info, "version").unwrap_or("")).with_dependencies(
        object_entries(info.get("dependencies"))
            .map(|(child, child_info)| convert_node(child, child_info))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use depwise_core::DependencyType;

    const LIST_OUTPUT: &str = r#"[
  {
    "name": "dashboard",
    "version": "0.3.1",
    "path": "/work/dashboard",
    "private": true,
    "dependencies": {
      "vue": {
        "from": "vue",
        "version": "3.4.21",
        "resolved": "https://registry.npmjs.org/vue/-/vue-3.4.21.tgz",
        "dependencies": {
          "@vue/shared": { "from": "@vue/shared", "version": "3.4.21" }
        }
      },
      "ui-kit": { "from": "ui-kit", "version": "link:../ui-kit" }
    },
    "devDependencies": {
      "vitest": { "from": "vitest", "version": "1.4.0" }
    },
    "optionalDependencies": {
      "fsevents": { "from": "fsevents", "version": "2.3.3" }
    }
  },
  { "name": "other-project", "version": "1.0.0" }
]"#;

    #[test]
    fn test_parse_tree_first_project() {
        let graph = parse_tree(LIST_OUTPUT);
        assert_eq!(graph.name, "dashboard");
        assert_eq!(graph.version, "0.3.1");

        let specs: Vec<String> = graph.dependencies.iter().map(|n| n.spec()).collect();
        assert_eq!(specs, vec!["vue@3.4.21", "ui-kit", "vitest@1.4.0", "fsevents@2.3.3"]);

        assert_eq!(graph.dependencies[0].dependencies[0].name, "@vue/shared");
        assert!(!graph.dependencies[0].dev);
        assert!(graph.dependencies[2].dev);
        assert!(graph.dependencies[3].optional);
    }

    #[test]
    fn test_parse_tree_degrades() {
        assert_eq!(parse_tree("[]"), DependencyGraph::empty());
        assert_eq!(parse_tree("\n"), DependencyGraph::empty());
        assert_eq!(parse_tree("ERR_PNPM_NO_IMPORTER_MANIFEST_FOUND"), DependencyGraph::empty());
        assert_eq!(parse_tree("\"text\""), DependencyGraph::empty());
    }

    #[test]
    fn test_parse_outdated() {
        let stdout = r#"{
  "eslint": { "current": "8.56.0", "latest": "9.0.0", "wanted": "8.57.0", "isDeprecated": false, "dependencyType": "devDependencies" },
  "zod": { "current": "3.22.4", "latest": "3.23.0", "wanted": "3.23.0", "isDeprecated": false, "dependencyType": "dependencies" }
}"#;
        let rows = parse_outdated(stdout);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "eslint");
        assert_eq!(rows[0].wanted, "8.57.0");
        assert_eq!(rows[0].dependency_type, DependencyType::Development);
        assert_eq!(rows[1].dependency_type, DependencyType::Direct);
    }

    #[test]
    fn test_install_args() {
        let pkgs = vec!["zod".to_string(), "vitest".to_string()];
        assert_eq!(
            PnpmAdapter::install_args(&pkgs, InstallOptions { dev: true, exact: false }),
            vec!["add", "--save-dev", "zod", "vitest"]
        );
    }
}
