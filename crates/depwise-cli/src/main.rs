//! depwise CLI - dependency inspection and management for JavaScript projects.

mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use depwise_core::{DependencyType, PackageManagerKind};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "depwise")]
#[command(version, about = "Inspect and manage dependencies of npm, yarn, pnpm and bun projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Flags shared by every subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project directory (the one holding package.json)
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Use this package manager instead of detecting one
    #[arg(long, global = true, value_name = "MANAGER")]
    pub manager: Option<PackageManagerKind>,

    /// Print machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Answer registry lookups from cache only
    #[arg(long, global = true)]
    pub offline: bool,

    /// Configuration file path (default: ~/.depwise/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// List declared dependencies
    List,

    /// Show packages the package manager reports as outdated
    Outdated,

    /// Print the installed dependency tree
    Tree {
        /// Maximum depth to print (unlimited by default)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Report problems the package manager flags in the installed tree
    Conflicts,

    /// Find production dependencies no source file imports
    Unused,

    /// Check the registry for newer versions
    Updates {
        /// Check a single declared package and report deprecation
        #[arg(long, value_name = "NAME")]
        package: Option<String>,
    },

    /// Scan for known vulnerabilities
    Audit,

    /// Check licenses against the configured policy
    Licenses {
        /// Additional allowed license (repeatable)
        #[arg(long = "allow", value_name = "LICENSE")]
        allow: Vec<String>,

        /// Additional blocked license (repeatable)
        #[arg(long = "block", value_name = "LICENSE")]
        block: Vec<String>,
    },

    /// Summarize updates, vulnerabilities, deprecations and licenses
    Dashboard,

    /// List every project below --path
    Projects,

    /// Add packages
    Install {
        #[arg(required = true, value_name = "PACKAGES")]
        packages: Vec<String>,

        /// Add as development dependencies
        #[arg(short = 'D', long)]
        dev: bool,

        /// Pin exact versions
        #[arg(short = 'E', long)]
        exact: bool,
    },

    /// Remove packages
    Uninstall {
        #[arg(required = true, value_name = "PACKAGES")]
        packages: Vec<String>,
    },

    /// Update packages (all when none are given)
    Update {
        #[arg(value_name = "PACKAGES")]
        packages: Vec<String>,
    },

    /// Apply the package manager's automatic vulnerability fixes
    AuditFix,

    /// Move a dependency to another bucket of package.json
    Move {
        name: String,

        /// Current bucket (dependencies, devDependencies, peerDependencies, optionalDependencies)
        #[arg(long)]
        from: DependencyType,

        /// Target bucket
        #[arg(long)]
        to: DependencyType,
    },

    /// Search the registry
    Search {
        query: String,

        #[arg(long, default_value_t = depwise_registry::DEFAULT_SEARCH_LIMIT)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// List published versions of a package, newest first
    Versions {
        name: String,

        /// Show at most this many versions
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Manage depwise configuration
    Config {
        #[command(subcommand)]
        command: commands::ConfigCommand,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = &cli.global;
    let open = || session::Session::open(global);
    match cli.command {
        Command::Config { command } => commands::handle_config_command(command, global).await,
        Command::Projects => commands::list_projects(global).await,
        Command::Search {
            query,
            limit,
            offset,
        } => commands::search(global, &query, limit, offset).await,
        Command::Versions { name, limit } => commands::versions(global, &name, limit).await,
        Command::List => commands::list(&open().await?).await,
        Command::Outdated => commands::outdated(&open().await?).await,
        Command::Tree { depth } => commands::tree(&open().await?, depth).await,
        Command::Conflicts => commands::conflicts(&open().await?).await,
        Command::Unused => commands::unused(&open().await?).await,
        Command::Updates { package } => commands::updates(&open().await?, package).await,
        Command::Audit => commands::audit(&open().await?).await,
        Command::Licenses { allow, block } => commands::licenses(&open().await?, allow, block).await,
        Command::Dashboard => commands::dashboard(&open().await?).await,
        Command::Install {
            packages,
            dev,
            exact,
        } => commands::install(&open().await?, &packages, dev, exact).await,
        Command::Uninstall { packages } => commands::uninstall(&open().await?, &packages).await,
        Command::Update { packages } => commands::update(&open().await?, &packages).await,
        Command::AuditFix => commands::audit_fix(&open().await?).await,
        Command::Move { name, from, to } => {
            commands::move_dependency(&open().await?, &name, from, to).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "depwise", "outdated", "--path", "web", "--manager", "pnpm", "--json", "-vv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Outdated));
        assert_eq!(cli.global.path, PathBuf::from("web"));
        assert_eq!(cli.global.manager, Some(PackageManagerKind::Pnpm));
        assert!(cli.global.json);
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn test_move_parses_bucket_names() {
        let cli = Cli::try_parse_from([
            "depwise",
            "move",
            "lodash",
            "--from",
            "dependencies",
            "--to",
            "devDependencies",
        ])
        .unwrap();
        match cli.command {
            Command::Move { name, from, to } => {
                assert_eq!(name, "lodash");
                assert_eq!(from, DependencyType::Direct);
                assert_eq!(to, DependencyType::Development);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["depwise", "move", "x", "--from", "deps", "--to", "dev"]).is_err());
    }

    #[test]
    fn test_install_requires_packages() {
        assert!(Cli::try_parse_from(["depwise", "install"]).is_err());
        let cli = Cli::try_parse_from(["depwise", "install", "-D", "vitest"]).unwrap();
        assert!(matches!(cli.command, Command::Install { dev: true, exact: false, .. }));
    }

    #[test]
    fn test_unknown_manager_rejected() {
        assert!(Cli::try_parse_from(["depwise", "list", "--manager", "cargo"]).is_err());
    }
}
