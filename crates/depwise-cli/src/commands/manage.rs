//! Commands that change the project through its package manager.

use crate::session::Session;
use anyhow::{Context, Result};
use colored::*;
use depwise_core::DependencyType;
use depwise_pm::{InstallOptions, ProcessOutput};

/// Relay the tool's output and mirror its exit status.
fn finish(output: ProcessOutput, what: &str) -> Result<()> {
    print!("{}", output.stdout);
    eprint!("{}", output.stderr);

    if !output.success() {
        tracing::warn!(exit_code = output.exit_code, "{what} failed");
        std::process::exit(if output.exit_code > 0 { output.exit_code } else { 1 });
    }
    eprintln!("{} {what}", "✓".green());
    Ok(())
}

pub async fn install(session: &Session, packages: &[String], dev: bool, exact: bool) -> Result<()> {
    let output = session
        .package_manager()
        .install(packages, InstallOptions { dev, exact })
        .await
        .context("Failed to run install")?;
    finish(output, &format!("Installed {}", packages.join(", ")))
}

pub async fn uninstall(session: &Session, packages: &[String]) -> Result<()> {
    let output = session
        .package_manager()
        .uninstall(packages)
        .await
        .context("Failed to run uninstall")?;
    finish(output, &format!("Removed {}", packages.join(", ")))
}

pub async fn update(session: &Session, packages: &[String]) -> Result<()> {
    let output = session
        .package_manager()
        .update(packages)
        .await
        .context("Failed to run update")?;
    let what = if packages.is_empty() {
        "Updated all packages".to_string()
    } else {
        format!("Updated {}", packages.join(", "))
    };
    finish(output, &what)
}

pub async fn audit_fix(session: &Session) -> Result<()> {
    let output = session
        .package_manager()
        .audit_fix()
        .await
        .context("Failed to run audit fix")?;
    finish(output, "Applied audit fixes")
}

pub async fn move_dependency(
    session: &Session,
    name: &str,
    from: DependencyType,
    to: DependencyType,
) -> Result<()> {
    session
        .package_manager()
        .move_dependency(name, from, to)
        .await
        .with_context(|| format!("Failed to move '{name}'"))?;
    eprintln!("{} Moved {name} from {from} to {to}", "✓".green());
    Ok(())
}
