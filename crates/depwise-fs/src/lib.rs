//! Project-scoped filesystem abstraction for depwise.
//!
//! Manifest reads and writes and source-file discovery all go through the
//! [`FileSystem`] trait, so the package-manager adapters and the analyzers
//! run unchanged against the real disk ([`NativeFileSystem`]) or an
//! in-memory tree ([`MemoryFileSystem`]).
//!
//! # Example
//!
//! ```no_run
//! use depwise_fs::{FileSystem, NativeFileSystem};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> std::io::Result<()> {
//! let fs = Arc::new(NativeFileSystem::new(".")?);
//! let manifest = fs.read_to_string(Path::new("package.json")).await?;
//! println!("{}", manifest);
//! # Ok(())
//! # }
//! ```

mod file_system;
mod paths;
pub use file_system::{DiscoveryOptions, FileMatch, FileSystem, DEFAULT_EXCLUDED_DIRS};

pub mod memory;
pub use memory::MemoryFileSystem;

#[cfg(feature = "native")]
pub mod native;
#[cfg(feature = "native")]
pub use native::NativeFileSystem;
