//! Package manager adapters for depwise.
//!
//! This crate drives the external npm, yarn, pnpm and bun tools and turns
//! their output into the canonical types of `depwise-core`:
//!
//! - [`CommandRunner`]: spawns the tools ([`TokioCommandRunner`]) or replays
//!   canned output ([`ScriptedRunner`])
//! - [`PackageManager`]: the operation set, one adapter per tool
//! - [`Manifest`]: `package.json` listing and bucket moves
//! - [`select_package_manager`] / [`ProjectDetector`]: which tool a project uses
//!
//! # Example
//!
//! ```no_run
//! use depwise_fs::NativeFileSystem;
//! use depwise_pm::{ProjectDetector, ProjectService, TokioCommandRunner};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fs = Arc::new(NativeFileSystem::new(".")?);
//! let detector = ProjectDetector::new(fs.clone());
//! let service = ProjectService::new(fs, Arc::new(TokioCommandRunner::new()));
//!
//! for project in detector.detect_projects(std::path::Path::new(".")).await? {
//!     let graph = service.package_manager(&project).dependency_tree().await?;
//!     println!("{}: {} nodes", project.name, graph.node_count());
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod context;
pub mod detect;
pub mod error;
pub mod factory;
pub mod manifest;
pub mod process;
pub mod traits;
pub mod update;

pub use adapters::{BunAdapter, NpmAdapter, PnpmAdapter, YarnAdapter};
pub use context::AdapterContext;
pub use detect::{
    project_id, select_package_manager, DetectionSignals, ProjectDetector, ProjectService,
};
pub use error::{Error, Result};
pub use factory::create_package_manager;
pub use manifest::{Manifest, PackageJson, MANIFEST_FILE};
pub use process::{CommandRunner, Invocation, ProcessOutput, ScriptedRunner, TokioCommandRunner};
pub use traits::{InstallOptions, PackageManager};
pub use update::FileUpdater;
