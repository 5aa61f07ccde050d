//! Read-only commands over one project (and `projects` over a tree).

use crate::output::{
    print_json, render_audit_summary, render_dashboard, render_packages, render_tree,
    severity_label, update_label,
};
use crate::session::{load_config, project_root, Session};
use crate::GlobalArgs;
use anyhow::{anyhow, Context, Result};
use colored::*;
use depwise_analysis::{
    attach_vulnerabilities, summary, AnalyticsAggregator, CancellationFlag, ConflictDetector,
    LicenseChecker, LicensePolicy, SecurityScanner, UnusedDependencyAnalyzer, UpdateChecker,
};
use depwise_core::{Project, UpdateType, ViolationType};
use depwise_fs::NativeFileSystem;
use depwise_pm::ProjectDetector;
use serde_json::json;
use std::sync::Arc;

pub async fn list(session: &Session) -> Result<()> {
    let packages = session
        .package_manager()
        .list()
        .await
        .context("Failed to read package.json")?;

    if session.json {
        return print_json(&packages);
    }
    if packages.is_empty() {
        println!("No dependencies declared.");
        return Ok(());
    }
    print!("{}", render_packages(&packages));
    Ok(())
}

pub async fn outdated(session: &Session) -> Result<()> {
    let rows = session
        .package_manager()
        .outdated()
        .await
        .context("Failed to run outdated check")?;

    if session.json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("{} All packages are up to date", "✓".green());
        return Ok(());
    }

    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(7);
    println!(
        "{}",
        format!("{:width$}  {:>10}  {:>10}  {:>10}  Type", "Package", "Current", "Wanted", "Latest")
            .bold()
    );
    for row in &rows {
        println!(
            "{:width$}  {:>10}  {:>10}  {:>10}  {}",
            row.name, row.current, row.wanted, row.latest, row.dependency_type
        );
    }
    Ok(())
}

pub async fn tree(session: &Session, depth: Option<usize>) -> Result<()> {
    let pm = session.package_manager();
    let graph = depwise_analysis::GraphBuilder::new(pm.as_ref())
        .generate()
        .await
        .context("Failed to build dependency tree")?;

    if session.json {
        return print_json(&graph);
    }
    print!("{}", render_tree(&graph, depth));
    Ok(())
}

pub async fn conflicts(session: &Session) -> Result<()> {
    let pm = session.package_manager();
    let report = ConflictDetector::new(pm.as_ref())
        .report()
        .await
        .context("Failed to analyze dependency tree")?;

    if session.json {
        return print_json(&report);
    }

    if report.conflicts.is_empty() {
        println!("{} No conflicts reported", "✓".green());
    } else {
        println!("{} ({}):", "Conflicts".red().bold(), report.conflicts.len());
        for conflict in &report.conflicts {
            println!("  {} [{}] {}", conflict.package_name.bold(), conflict.kind, conflict.message);
        }
    }

    let duplicated: Vec<_> = report.duplicated().collect();
    if !duplicated.is_empty() {
        println!("\n{}", "Installed in several versions:".dimmed());
        for (name, versions) in duplicated {
            let versions: Vec<&str> = versions.iter().map(String::as_str).collect();
            println!("  {name}: {}", versions.join(", "));
        }
    }
    Ok(())
}

pub async fn unused(session: &Session) -> Result<()> {
    let pm = session.package_manager();
    let unused = UnusedDependencyAnalyzer::new(pm.as_ref())
        .find_unused_dependencies()
        .await
        .context("Failed to scan for unused dependencies")?;

    if session.json {
        return print_json(&unused);
    }
    if unused.is_empty() {
        println!("{} Every production dependency is imported", "✓".green());
        return Ok(());
    }
    println!("{} ({}):", "Possibly unused".yellow().bold(), unused.len());
    for name in &unused {
        println!("  {name}");
    }
    println!(
        "\n{}",
        "Static scan only: dynamic requires and type-only packages are not detected.".dimmed()
    );
    Ok(())
}

pub async fn updates(session: &Session, package: Option<String>) -> Result<()> {
    let packages = session
        .package_manager()
        .list()
        .await
        .context("Failed to read package.json")?;
    let checker = UpdateChecker::new(session.registry.clone());

    if let Some(name) = package {
        let pkg = packages
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| anyhow!("'{name}' is not declared in package.json"))?;
        let checked = checker.check_single_package(pkg).await;

        if session.json {
            return print_json(&checked);
        }
        match (&checked.latest_version, checked.update_available) {
            (None, _) => println!("{name}: not found in the registry"),
            (Some(latest), Some(update)) => println!(
                "{name}: {} -> {latest} ({})",
                checked.current_version,
                update_label(update)
            ),
            (Some(latest), None) => println!("{name}: {latest} (up to date)"),
        }
        if let Some(message) = &checked.deprecation_message {
            println!("  {} {message}", "deprecated:".red());
        }
        return Ok(());
    }

    let checked = checker.check_updates(&packages).await;
    let summary = depwise_analysis::update_summary(&checked);

    if session.json {
        return print_json(&json!({ "packages": checked, "summary": summary }));
    }

    for pkg in checked.iter().filter(|p| p.has_update()) {
        let update = pkg.update_available.unwrap_or(UpdateType::None);
        println!(
            "  {:30} {:>10} -> {:<10} {}",
            pkg.name,
            pkg.current_version,
            pkg.latest_version.as_deref().unwrap_or("?"),
            update_label(update)
        );
    }
    println!(
        "\n{} of {} packages have updates ({} major, {} minor, {} patch)",
        summary.outdated(),
        summary.total,
        summary.major,
        summary.minor,
        summary.patch
    );
    Ok(())
}

pub async fn audit(session: &Session) -> Result<()> {
    let scanner = SecurityScanner::new(session.runner.clone());
    let results = scanner
        .scan(&session.project.path, session.project.package_manager)
        .await;
    let totals = summary(&results);

    if session.json {
        return print_json(&json!({ "results": results, "summary": totals }));
    }

    for result in &results {
        println!("{}", result.package_name.bold());
        for vulnerability in &result.vulnerabilities {
            println!(
                "  [{}] {} ({})",
                severity_label(vulnerability.severity),
                vulnerability.title,
                vulnerability.affected_versions
            );
            if let Some(recommendation) = &vulnerability.recommendation {
                println!("    {}", recommendation.dimmed());
            }
        }
    }
    println!("{}", render_audit_summary(&totals));

    let threshold = session.config.severity_threshold;
    let reportable = totals.count_at_least(threshold);
    if reportable > 0 {
        println!("{reportable} at or above the '{threshold}' threshold");
    }
    Ok(())
}

pub async fn licenses(session: &Session, allow: Vec<String>, block: Vec<String>) -> Result<()> {
    let mut policy = LicensePolicy::new(
        session.config.allowed_licenses.clone(),
        session.config.blocked_licenses.clone(),
    );
    policy.allowed.extend(allow);
    policy.blocked.extend(block);

    if policy.is_empty() {
        println!("No license policy configured (set allowed_licenses or blocked_licenses).");
        return Ok(());
    }

    let packages = session
        .package_manager()
        .list()
        .await
        .context("Failed to read package.json")?;

    let cancel = CancellationFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let violations = LicenseChecker::new(session.registry.clone())
        .check_licenses(&packages, &policy, &cancel)
        .await;
    if cancel.is_cancelled() {
        eprintln!("{}", "Interrupted: results are partial".yellow());
    }

    if session.json {
        return print_json(&violations);
    }
    if violations.is_empty() {
        println!("{} No license violations", "✓".green());
        return Ok(());
    }
    for violation in &violations {
        println!(
            "  {} {} ({})",
            violation.package_name.bold(),
            violation.license.red(),
            match violation.violation_type {
                ViolationType::Blocked => "blocked",
                ViolationType::NotAllowed => "not allowed",
            }
        );
    }
    Ok(())
}

pub async fn dashboard(session: &Session) -> Result<()> {
    let project = session.refreshed_project().await;

    let checked = UpdateChecker::new(session.registry.clone())
        .check_updates(&project.packages)
        .await;
    let results = SecurityScanner::new(session.runner.clone())
        .scan(&project.path, project.package_manager)
        .await;
    let packages = attach_vulnerabilities(&checked, &results);

    let threshold = session.config.severity_threshold;
    let project = Project {
        has_updates: packages.iter().any(|p| p.has_update()),
        has_security_issues: summary(&results).count_at_least(threshold) > 0,
        packages,
        ..project
    };

    let data = AnalyticsAggregator::new(session.registry.clone())
        .aggregate(&project)
        .await;

    if session.json {
        return print_json(&data);
    }
    print!("{}", render_dashboard(&data));
    Ok(())
}

pub async fn list_projects(global: &GlobalArgs) -> Result<()> {
    let config = load_config(global).await?;
    let root = project_root(global)?;
    let fs = Arc::new(
        NativeFileSystem::new(&root)
            .with_context(|| format!("Cannot open {}", root.display()))?,
    );

    let projects = ProjectDetector::new(fs)
        .with_default_manager(config.default_package_manager.kind())
        .detect_projects(&root)
        .await
        .context("Failed to search for projects")?;

    if global.json {
        return print_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects found under {}", root.display());
        return Ok(());
    }
    for project in &projects {
        println!(
            "{} {} ({})",
            project.id.dimmed(),
            project.name.bold(),
            project.package_manager
        );
        println!("  {}", project.path.display());
    }
    println!("\nTotal: {} project(s)", projects.len());
    Ok(())
}
