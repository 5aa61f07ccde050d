use crate::output::print_json;
use crate::session::load_config;
use crate::GlobalArgs;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use depwise_config::ConfigManager;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a default config file at ~/.depwise/config.toml (or --config)
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show config file path
    Path,

    /// Print the effective configuration
    Show,
}

pub async fn handle_config_command(cmd: ConfigCommand, global: &GlobalArgs) -> Result<()> {
    match cmd {
        ConfigCommand::Init { force } => init_config(global, force).await,
        ConfigCommand::Path => show_config_path(global),
        ConfigCommand::Show => show_config(global).await,
    }
}

fn config_path(global: &GlobalArgs) -> Result<PathBuf> {
    match &global.config {
        Some(path) => Ok(path.clone()),
        None => ConfigManager::config_path().context("Cannot locate the home directory"),
    }
}

async fn init_config(global: &GlobalArgs, force: bool) -> Result<()> {
    let config_path = config_path(global)?;

    if config_path.exists() && !force {
        println!("Config already exists at: {}", config_path.display());
        println!("To reinitialize, run 'depwise config init --force'.");
        return Ok(());
    }

    ConfigManager::init_at(&config_path)
        .await
        .with_context(|| format!("Failed to write config at {}", config_path.display()))?;
    println!("{} Initialized config at: {}", "✓".green(), config_path.display());
    Ok(())
}

fn show_config_path(global: &GlobalArgs) -> Result<()> {
    println!("{}", config_path(global)?.display());
    Ok(())
}

async fn show_config(global: &GlobalArgs) -> Result<()> {
    let config = load_config(global).await?;
    if global.json {
        return print_json(&config);
    }
    let text = toml::to_string_pretty(&config).context("Failed to render config")?;
    print!("{text}");
    Ok(())
}
