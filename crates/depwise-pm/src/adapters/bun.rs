//! bun adapter.
//!
//! bun has no JSON output for listing or outdated checks, so both are
//! parsed from the text it prints for humans.

use super::{degraded, split_spec, DepthTreeBuilder};
use crate::context::AdapterContext;
use crate::error::Error;
use crate::process::ProcessOutput;
use crate::traits::{InstallOptions, PackageManager};
use crate::Result;
use depwise_core::{
    DependencyGraph, DependencyNode, DependencyType, OutdatedPackage, PackageManagerKind,
};
use regex::Regex;
use std::sync::LazyLock;

const KIND: PackageManagerKind = PackageManagerKind::Bun;

/// Width of one nesting level in `bun pm ls` output (`│   ` or four spaces).
const INDENT_WIDTH: usize = 4;

static TREE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:│   |    )*)(├──|└──) (.+)$").expect("valid tree line regex")
});

/// Drives the `bun` CLI.
#[derive(Debug, Clone)]
pub struct BunAdapter {
    ctx: AdapterContext,
}

impl BunAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        Self { ctx }
    }

    pub fn install_args(packages: &[String], options: InstallOptions) -> Vec<String> {
        let mut args = vec!["add".to_string()];
        if options.dev {
            args.push("-d".to_string());
        }
        if options.exact {
            args.push("--exact".to_string());
        }
        args.extend(packages.iter().cloned());
        args
    }
}

#[async_trait::async_trait]
impl PackageManager for BunAdapter {
    fn kind(&self) -> PackageManagerKind {
        KIND
    }

    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    async fn install(&self, packages: &[String], options: InstallOptions) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Installing");
        self.ctx.run("bun", Self::install_args(packages, options)).await
    }

    async fn uninstall(&self, packages: &[String]) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Uninstalling");
        let args = std::iter::once("remove".to_string()).chain(packages.iter().cloned());
        self.ctx.run("bun", args).await
    }

    async fn update(&self, packages: &[String]) -> Result<ProcessOutput> {
        tracing::info!(manager = %KIND, ?packages, "Updating");
        let args = std::iter::once("update".to_string()).chain(packages.iter().cloned());
        self.ctx.run("bun", args).await
    }

    async fn outdated(&self) -> Result<Vec<OutdatedPackage>> {
        let output = self.ctx.run("bun", ["outdated"]).await?;
        if !output.success() && output.stdout.trim().is_empty() {
            degraded(KIND, "outdated", &format!("exit code {}", output.exit_code));
            return Ok(Vec::new());
        }
        Ok(parse_outdated(&output.stdout))
    }

    async fn dependency_tree(&self) -> Result<DependencyGraph> {
        let output = self.ctx.run("bun", ["pm", "ls", "--all"]).await?;
        if !output.success() {
            degraded(KIND, "dependency tree", &format!("exit code {}", output.exit_code));
            return Ok(DependencyGraph::empty());
        }
        Ok(parse_tree(&output.stdout))
    }

    async fn audit_fix(&self) -> Result<ProcessOutput> {
        Err(Error::Unsupported {
            manager: KIND,
            operation: "audit fix",
            hint: "Use 'bun pm trust' or update packages manually.",
        })
    }
}

/// Parse the box-drawn tree printed by `bun pm ls --all`.
///
/// The first line names the project (`/path/to/app node_modules (42)`);
/// every following line is one entry whose depth is the width of its
/// indentation prefix divided by four.
pub fn parse_tree(stdout: &str) -> DependencyGraph {
    let mut lines = stdout.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return DependencyGraph::empty();
    };

    let mut builder = DepthTreeBuilder::new();
    for line in lines {
        let Some(caps) = TREE_LINE.captures(line) else {
            continue;
        };
        let depth = caps[1].chars().count() / INDENT_WIDTH;
        let Some(spec) = caps[3].split_whitespace().next() else {
            continue;
        };
        let (name, version) = split_spec(spec);
        builder.push(depth, DependencyNode::new(name, version));
    }

    DependencyGraph {
        name: root_name(header),
        dependencies: builder.finish(),
        ..DependencyGraph::empty()
    }
}

/// Last path component of the header's first token.
fn root_name(header: &str) -> String {
    header
        .split_whitespace()
        .next()
        .and_then(|path| path.rsplit(|c: char| c == '/' || c == '\\').find(|part| !part.is_empty()))
        .unwrap_or("root")
        .to_string()
}

/// Parse `bun outdated`, in either its box-drawn table or plain column form.
pub fn parse_outdated(stdout: &str) -> Vec<OutdatedPackage> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            !(is_header_row(line)
                || line.contains('─')
                || line.contains("All packages")
                || line.starts_with("bun "))
        })
        .filter_map(|line| {
            if line.contains('│') {
                parse_table_row(line)
            } else {
                parse_plain_row(line)
            }
        })
        .filter(|pkg| pkg.latest.chars().any(|c| c.is_ascii_digit()))
        .collect()
}

/// The `Package  Current  Update  Latest` header, boxed or plain.
fn is_header_row(line: &str) -> bool {
    line.trim_start_matches('│')
        .split(|c: char| c == '│' || c.is_whitespace())
        .find(|cell| !cell.is_empty())
        == Some("Package")
}

/// `│ react (dev) │ 18.2.0 │ 18.3.1 │ 19.0.0 │`
fn parse_table_row(line: &str) -> Option<OutdatedPackage> {
    let cells: Vec<&str> = line
        .split('│')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect();
    let [name, current, update, latest, ..] = cells.as_slice() else {
        return None;
    };
    let (name, dependency_type) = strip_type_suffix(name);

    Some(OutdatedPackage {
        name: name.to_string(),
        current: current.to_string(),
        wanted: update.to_string(),
        latest: latest.to_string(),
        dependency_type,
    })
}

/// `react (dev)  18.2.0  18.3.1  19.0.0`, with the wanted column optional.
fn parse_plain_row(line: &str) -> Option<OutdatedPackage> {
    let mut parts: Vec<&str> = line.split_whitespace().collect();
    let mut dependency_type = DependencyType::Direct;
    if let Some(label) = parts.get(1).and_then(|p| type_label(p)) {
        dependency_type = label;
        parts.remove(1);
    }

    let (name, current, wanted, latest) = match parts.as_slice() {
        [name, current, wanted, latest, ..] => (*name, *current, *wanted, *latest),
        [name, current, latest] => (*name, *current, *latest, *latest),
        _ => return None,
    };

    Some(OutdatedPackage {
        name: name.to_string(),
        current: current.to_string(),
        wanted: wanted.to_string(),
        latest: latest.to_string(),
        dependency_type,
    })
}

/// `(dev)` → `Development`, and so on.
fn type_label(token: &str) -> Option<DependencyType> {
    match token {
        "(dev)" => Some(DependencyType::Development),
        "(peer)" => Some(DependencyType::Peer),
        "(optional)" => Some(DependencyType::Optional),
        _ => None,
    }
}

fn strip_type_suffix(name: &str) -> (&str, DependencyType) {
    match name.rsplit_once(' ') {
        Some((base, suffix)) => match type_label(suffix) {
            Some(kind) => (base.trim_end(), kind),
            None => (name, DependencyType::Direct),
        },
        None => (name, DependencyType::Direct),
    }
}
