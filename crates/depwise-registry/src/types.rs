//! Registry response and option types.

use crate::cache::DEFAULT_TTL;
use crate::client::DEFAULT_TIMEOUT;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Public npm registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default page size for searches.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Accept a field only if it has the expected shape; anything else becomes `None`.
///
/// Registry documents are user-authored and fields like `keywords` or `time`
/// occasionally carry the wrong type. One malformed field should not make the
/// whole package unreadable.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Read a string, or the `type` field of an object (old `license` shape).
fn string_or_type(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Object(obj) => obj
            .get("type")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from),
        _ => None,
    }
}

/// Metadata for a single published version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub version: String,
    /// Deprecation message; a string when deprecated, sometimes `false` otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<serde_json::Value>,
}

impl VersionInfo {
    /// The deprecation message, if this version is deprecated.
    pub fn deprecation_message(&self) -> Option<&str> {
        self.deprecated
            .as_ref()
            .and_then(|d| d.as_str())
            .filter(|message| !message.is_empty())
    }
}

/// A package document as served by `GET {registry}/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryPackage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub versions: BTreeMap<String, VersionInfo>,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    /// Publish timestamps keyed by version, plus `created` and `modified`
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub time: Option<BTreeMap<String, String>>,
}

impl RegistryPackage {
    /// The `latest` dist-tag.
    pub fn latest_version(&self) -> Option<&str> {
        self.dist_tags.get("latest").map(String::as_str)
    }

    /// License name, accepting both `"MIT"` and `{ "type": "MIT" }`.
    ///
    /// Falls back to the license of the latest version when the top-level
    /// field is absent.
    pub fn license_name(&self) -> Option<String> {
        self.license.as_ref().and_then(string_or_type).or_else(|| {
            self.latest_version()
                .and_then(|latest| self.versions.get(latest))
                .and_then(|info| info.license.as_ref())
                .and_then(string_or_type)
        })
    }

    /// Deprecation message of the given version, if any.
    pub fn deprecation_of(&self, version: &str) -> Option<&str> {
        self.versions.get(version)?.deprecation_message()
    }

    /// Repository URL, accepting both a string and `{ "url": ... }`.
    pub fn repository_url(&self) -> Option<String> {
        match self.repository.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(obj) => {
                obj.get("url").and_then(|v| v.as_str()).map(String::from)
            }
            _ => None,
        }
    }
}

/// Links attached to a search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<SearchLinks>,
}

/// Paging for [`crate::RegistryClient::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }
}

/// Raw `/-/v1/search` response.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub objects: Vec<SearchObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchObject {
    pub package: SearchPackage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchPackage {
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub keywords: Option<Vec<String>>,
    pub author: Option<serde_json::Value>,
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub links: Option<SearchLinks>,
}

impl From<SearchObject> for SearchResult {
    fn from(object: SearchObject) -> Self {
        let pkg = object.package;
        let author = pkg.author.as_ref().and_then(|author| match author {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(obj) => {
                obj.get("name").and_then(|v| v.as_str()).map(String::from)
            }
            _ => None,
        });

        SearchResult {
            name: pkg.name,
            version: pkg.version,
            description: pkg.description,
            keywords: pkg.keywords,
            author,
            date: pkg.date,
            links: pkg.links,
        }
    }
}

/// Construction options for [`crate::RegistryClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryOptions {
    pub registry_url: String,
    pub cache_ttl: Duration,
    pub offline: bool,
    pub timeout: Duration,
    /// Client-side request ceiling; `None` disables limiting
    pub requests_per_second: Option<u32>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            cache_ttl: DEFAULT_TTL,
            offline: false,
            timeout: DEFAULT_TIMEOUT,
            requests_per_second: None,
        }
    }
}
