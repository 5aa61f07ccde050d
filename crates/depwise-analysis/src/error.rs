//! Error types for depwise-analysis

use thiserror::Error;

/// Result type alias using depwise-analysis Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during analysis
#[derive(Debug, Error)]
pub enum Error {
    /// The package manager could not list or run
    #[error(transparent)]
    PackageManager(#[from] depwise_pm::Error),

    /// IO error while scanning sources
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
