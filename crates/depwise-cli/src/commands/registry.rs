//! Registry lookups that need no project.

use crate::output::print_json;
use crate::session::{load_config, registry_client};
use crate::GlobalArgs;
use anyhow::Result;
use colored::*;
use depwise_registry::SearchOptions;

pub async fn search(global: &GlobalArgs, query: &str, limit: usize, offset: usize) -> Result<()> {
    let config = load_config(global).await?;
    let registry = registry_client(&config, global)?;
    let results = registry.search(query, &SearchOptions { limit, offset }).await;

    if global.json {
        return print_json(&results);
    }
    if results.is_empty() {
        println!("No packages found for '{query}'.");
        return Ok(());
    }
    for result in &results {
        println!("{}@{}", result.name.bold(), result.version);
        if let Some(description) = &result.description {
            println!("  {description}");
        }
    }
    Ok(())
}

pub async fn versions(global: &GlobalArgs, name: &str, limit: Option<usize>) -> Result<()> {
    let config = load_config(global).await?;
    let registry = registry_client(&config, global)?;
    let mut versions = registry.get_versions(name).await;
    if let Some(limit) = limit {
        versions.truncate(limit);
    }

    if global.json {
        return print_json(&versions);
    }
    if versions.is_empty() {
        println!("No versions found for '{name}'.");
        return Ok(());
    }
    for version in &versions {
        println!("{version}");
    }
    Ok(())
}
