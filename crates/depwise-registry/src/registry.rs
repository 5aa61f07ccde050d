//! Cached npm registry client.

use crate::cache::TtlCache;
use crate::client::HttpClient;
use crate::error::{Error, Result};
use crate::types::{RegistryOptions, RegistryPackage, SearchOptions, SearchResponse, SearchResult};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use url::Url;

/// Anything that can resolve a package name to registry metadata.
///
/// The analyzers depend on this seam instead of on [`RegistryClient`], so
/// they can run against fixed data.
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch package metadata; `None` when unknown or unreachable.
    async fn get_package(&self, name: &str) -> Option<Arc<RegistryPackage>>;
}

/// npm registry client with a TTL cache and an offline switch.
///
/// Every lookup checks the cache first, then the offline flag, and only then
/// touches the network. Failures of any kind are logged at debug level and
/// reported as "not found".
#[derive(Debug)]
pub struct RegistryClient {
    http: HttpClient,
    base_url: Url,
    packages: TtlCache<Arc<RegistryPackage>>,
    searches: TtlCache<Vec<SearchResult>>,
    offline: AtomicBool,
}

impl RegistryClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry URL is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(options: RegistryOptions) -> Result<Self> {
        let base_url = Url::parse(&options.registry_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::CannotBeABase(options.registry_url));
        }

        let http = match options.requests_per_second {
            Some(rate) => HttpClient::with_rate_limit(options.timeout, rate)?,
            None => HttpClient::new(options.timeout)?,
        };

        Ok(Self {
            http,
            base_url,
            packages: TtlCache::new(options.cache_ttl),
            searches: TtlCache::new(options.cache_ttl),
            offline: AtomicBool::new(options.offline),
        })
    }

    /// Toggle offline mode. While offline, cache misses return none/empty.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::Relaxed);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(AtomicOrdering::Relaxed)
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.packages.clear();
        self.searches.clear();
    }

    /// The metadata URL for `name`. Scoped names keep their `@` and have the
    /// `/` encoded as `%2F`.
    pub fn package_url(&self, name: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::CannotBeABase(self.base_url.to_string()))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    /// The search URL. `from` is only sent for a non-zero offset.
    pub fn search_url(&self, query: &str, options: &SearchOptions) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::CannotBeABase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["-", "v1", "search"]);
        {
            let mut query_pairs = url.query_pairs_mut();
            query_pairs
                .append_pair("text", query)
                .append_pair("size", &options.limit.to_string());
            if options.offset > 0 {
                query_pairs.append_pair("from", &options.offset.to_string());
            }
        }
        Ok(url)
    }

    /// Fetch package metadata.
    pub async fn get_package(&self, name: &str) -> Option<Arc<RegistryPackage>> {
        let key = format!("pkg:{name}");
        if let Some(cached) = self.packages.get(&key) {
            return Some(cached);
        }

        if self.is_offline() {
            tracing::debug!(package = %name, "Offline: skipping registry lookup");
            return None;
        }

        match self.fetch_package(name).await {
            Ok(pkg) => {
                let pkg = Arc::new(pkg);
                self.packages.insert(key, Arc::clone(&pkg));
                Some(pkg)
            }
            Err(err) => {
                tracing::debug!(package = %name, error = %err, "Registry lookup failed");
                None
            }
        }
    }

    async fn fetch_package(&self, name: &str) -> Result<RegistryPackage> {
        let url = self.package_url(name)?;
        self.http.get_json(url.as_str()).await
    }

    /// The `latest` dist-tag of a package.
    pub async fn get_latest_version(&self, name: &str) -> Option<String> {
        self.get_package(name)
            .await
            .and_then(|pkg| pkg.latest_version().map(String::from))
    }

    /// Search the registry.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let key = format!("search:{query}:{}:{}", options.limit, options.offset);
        if let Some(cached) = self.searches.get(&key) {
            return cached;
        }

        if self.is_offline() {
            tracing::debug!(query = %query, "Offline: skipping registry search");
            return Vec::new();
        }

        match self.fetch_search(query, options).await {
            Ok(results) => {
                self.searches.insert(key, results.clone());
                results
            }
            Err(err) => {
                tracing::debug!(query = %query, error = %err, "Registry search failed");
                Vec::new()
            }
        }
    }

    async fn fetch_search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let url = self.search_url(query, options)?;
        let response: SearchResponse = self.http.get_json(url.as_str()).await?;
        Ok(response.objects.into_iter().map(SearchResult::from).collect())
    }

    /// All published versions, newest first.
    pub async fn get_versions(&self, name: &str) -> Vec<String> {
        match self.get_package(name).await {
            Some(pkg) => sort_versions_descending(pkg.versions.keys().cloned().collect()),
            None => Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl MetadataSource for RegistryClient {
    async fn get_package(&self, name: &str) -> Option<Arc<RegistryPackage>> {
        RegistryClient::get_package(self, name).await
    }
}

/// Sort by semver precedence, newest first. Keys that are not valid semver
/// sort after all valid ones, in reverse lexical order.
pub fn sort_versions_descending(mut versions: Vec<String>) -> Vec<String> {
    versions.sort_by(|a, b| {
        match (
            node_semver::Version::parse(a).ok(),
            node_semver::Version::parse(b).ok(),
        ) {
            (Some(va), Some(vb)) => vb.cmp(&va),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.cmp(a),
        }
    });
    versions
}
