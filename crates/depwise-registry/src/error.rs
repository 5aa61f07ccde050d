//! Error types for depwise-registry

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the registry.
///
/// The public lookup methods of [`crate::RegistryClient`] never surface these;
/// they log them and degrade to "not found".
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The registry URL cannot carry path segments (e.g. `mailto:`)
    #[error("Registry URL cannot be used as a base: {0}")]
    CannotBeABase(String),

    /// Non-success HTTP status
    #[error("HTTP request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded for URL: {0}")]
    RateLimitExceeded(String),
}
