//! Terminal and JSON rendering of command results.

use anyhow::{Context, Result};
use colored::*;
use depwise_core::{
    AuditSummary, DashboardData, DependencyGraph, DependencyNode, DependencyType,
    InstalledPackage, Severity, UpdateType,
};
use serde::Serialize;
use std::fmt::Write;

/// Pretty-printed JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

pub fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.red(),
        Severity::Moderate => label.yellow(),
        Severity::Low => label.normal(),
    }
}

pub fn update_label(update: UpdateType) -> ColoredString {
    let label = update.to_string();
    match update {
        UpdateType::Major => label.red(),
        UpdateType::Minor => label.yellow(),
        UpdateType::Patch => label.green(),
        UpdateType::None => label.dimmed(),
    }
}

/// Declared packages grouped by bucket, in manifest order.
pub fn render_packages(packages: &[InstalledPackage]) -> String {
    let mut out = String::new();
    for bucket in DependencyType::ALL {
        let in_bucket: Vec<_> = packages
            .iter()
            .filter(|p| p.dependency_type == bucket)
            .collect();
        if in_bucket.is_empty() {
            continue;
        }

        let _ = writeln!(out, "{} ({}):", bucket.to_string().bold(), in_bucket.len());
        let width = in_bucket.iter().map(|p| p.name.len()).max().unwrap_or(0);
        for pkg in in_bucket {
            let _ = writeln!(out, "  {:width$}  {}", pkg.name, pkg.specified_version);
        }
    }
    out
}

/// Indented tree, children two spaces deeper than their parent.
///
/// `max_depth` counts top-level dependencies as depth 1.
pub fn render_tree(graph: &DependencyGraph, max_depth: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}@{}", graph.name.bold(), graph.version);
    for node in &graph.dependencies {
        render_node(&mut out, node, 1, max_depth);
    }
    out
}

fn render_node(out: &mut String, node: &DependencyNode, depth: usize, max_depth: Option<usize>) {
    if max_depth.is_some_and(|max| depth > max) {
        return;
    }

    let mut flags = Vec::new();
    if node.dev {
        flags.push("dev");
    }
    if node.optional {
        flags.push("optional");
    }
    if node.peer {
        flags.push("peer");
    }

    let _ = write!(out, "{}{}", "  ".repeat(depth), node.spec());
    if !flags.is_empty() {
        let _ = write!(out, " {}", format!("({})", flags.join(", ")).dimmed());
    }
    if let Some(error) = &node.error {
        let _ = write!(out, " {}", error.red());
    }
    out.push('\n');

    for child in &node.dependencies {
        render_node(out, child, depth + 1, max_depth);
    }
}

pub fn render_audit_summary(summary: &AuditSummary) -> String {
    if summary.is_clean() {
        return format!("{} No known vulnerabilities", "✓".green());
    }
    format!(
        "{} vulnerabilities ({} critical, {} high, {} moderate, {} low)",
        summary.total.to_string().bold(),
        summary.critical.to_string().red().bold(),
        summary.high.to_string().red(),
        summary.moderate.to_string().yellow(),
        summary.low,
    )
}

pub fn render_dashboard(data: &DashboardData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", data.project_name.bold());
    let _ = writeln!(out, "{}", "=".repeat(data.project_name.chars().count().max(20)));
    let _ = writeln!(out, "Packages: {}", data.total_packages);

    let updates = &data.update_status;
    let _ = writeln!(out, "\n{}", "Updates:".bold());
    let _ = writeln!(out, "  up to date: {}", updates.up_to_date);
    let _ = writeln!(out, "  patch:      {}", updates.patch);
    let _ = writeln!(out, "  minor:      {}", updates.minor);
    let _ = writeln!(out, "  major:      {}", updates.major);

    let security = &data.security;
    let _ = writeln!(out, "\n{}", "Security:".bold());
    let _ = writeln!(out, "  vulnerabilities: {}", security.total_vulnerabilities);
    let _ = writeln!(out, "  critical: {}  high: {}  moderate: {}  low: {}",
        security.critical, security.high, security.moderate, security.low);

    let _ = writeln!(out, "\n{} {}", "Deprecated:".bold(), data.deprecation.total);

    if !data.licenses.is_empty() {
        let _ = writeln!(out, "\n{}", "Licenses:".bold());
        let mut licenses: Vec<_> = data.licenses.iter().collect();
        licenses.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (license, count) in licenses {
            let _ = writeln!(out, "  {license}: {count}");
        }
    }
    out
}
