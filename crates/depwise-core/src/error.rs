//! Error types for depwise core.

use thiserror::Error;

/// Result type for depwise core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when parsing the string forms of core enums.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The name does not match any supported package manager.
    #[error("Unknown package manager: {0} (expected npm, yarn, pnpm or bun)")]
    UnknownPackageManager(String),

    /// The name does not match any dependency bucket.
    #[error("Unknown dependency type: {0}")]
    UnknownDependencyType(String),

    /// The name does not match any vulnerability severity.
    #[error("Unknown severity: {0} (expected critical, high, moderate or low)")]
    UnknownSeverity(String),
}
