//! npm registry client for depwise.
//!
//! [`RegistryClient`] fetches package documents and search results over HTTP
//! and keeps them in a [`TtlCache`]. Lookups never fail: an unreachable
//! registry, a non-success status and a malformed body are all reported as
//! "not found", and offline mode short-circuits every cache miss.
//!
//! # Example
//!
//! ```no_run
//! use depwise_registry::{RegistryClient, RegistryOptions, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RegistryClient::new(RegistryOptions::default())?;
//!
//!     if let Some(latest) = client.get_latest_version("react").await {
//!         println!("react@{}", latest);
//!     }
//!
//!     for hit in client.search("date picker", &SearchOptions::default()).await {
//!         println!("{} {}", hit.name, hit.version);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod cache;
mod client;
mod error;
mod registry;
mod types;

pub use cache::{TtlCache, DEFAULT_TTL};
pub use client::{HttpClient, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use registry::{sort_versions_descending, MetadataSource, RegistryClient};
pub use types::{
    RegistryOptions, RegistryPackage, SearchLinks, SearchOptions, SearchResult, VersionInfo,
    DEFAULT_REGISTRY_URL, DEFAULT_SEARCH_LIMIT,
};
