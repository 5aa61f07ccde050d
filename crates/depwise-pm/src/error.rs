//! Error types for depwise-pm

use depwise_core::{DependencyType, PackageManagerKind};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using depwise-pm Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a package manager
#[derive(Debug, Error)]
pub enum Error {
    /// The external tool could not be started at all
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest is not valid JSON
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No manifest at the expected location
    #[error("Manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// Manifest parsed but has an unexpected shape
    #[error("Invalid manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// The source bucket of a move does not exist
    #[error("No {bucket} section in manifest")]
    BucketNotFound { bucket: DependencyType },

    /// The package of a move is not declared in the source bucket
    #[error("Package {name} not found in {bucket}")]
    PackageNotFound { name: String, bucket: DependencyType },

    /// The tool has no equivalent of the requested operation
    #[error("{manager} does not support '{operation}'. {hint}")]
    Unsupported {
        manager: PackageManagerKind,
        operation: &'static str,
        hint: &'static str,
    },
}
