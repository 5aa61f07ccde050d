use depwise_core::{PackageManagerKind, Severity};
use depwise_registry::{RegistryOptions, DEFAULT_REGISTRY_URL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Schema version written by `config init`.
pub const CONFIG_VERSION: &str = "1.0";

/// Package manager used when a project gives no other signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultPackageManager {
    /// Fall through to npm
    #[default]
    Auto,
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl DefaultPackageManager {
    /// The configured tool, or `None` for `auto`.
    pub fn kind(self) -> Option<PackageManagerKind> {
        match self {
            DefaultPackageManager::Auto => None,
            DefaultPackageManager::Npm => Some(PackageManagerKind::Npm),
            DefaultPackageManager::Yarn => Some(PackageManagerKind::Yarn),
            DefaultPackageManager::Pnpm => Some(PackageManagerKind::Pnpm),
            DefaultPackageManager::Bun => Some(PackageManagerKind::Bun),
        }
    }
}

impl fmt::Display for DefaultPackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{kind}"),
            None => f.write_str("auto"),
        }
    }
}

impl FromStr for DefaultPackageManager {
    type Err = depwise_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(DefaultPackageManager::Auto);
        }
        Ok(match s.parse::<PackageManagerKind>()? {
            PackageManagerKind::Npm => DefaultPackageManager::Npm,
            PackageManagerKind::Yarn => DefaultPackageManager::Yarn,
            PackageManagerKind::Pnpm => DefaultPackageManager::Pnpm,
            PackageManagerKind::Bun => DefaultPackageManager::Bun,
        })
    }
}

/// Main configuration structure for depwise.
///
/// Every field has a default, so a partial (or empty) file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepwiseConfig {
    /// Schema version for migrations
    pub version: String,

    /// Fallback when neither `packageManager` nor a lockfile decides
    pub default_package_manager: DefaultPackageManager,

    pub registry_url: String,

    /// Serve registry data from cache only
    pub offline_mode: bool,

    /// Registry cache time-to-live
    pub cache_timeout_minutes: u64,

    /// Per-request registry timeout
    pub http_timeout_secs: u64,

    /// Client-side registry request ceiling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_requests_per_second: Option<u32>,

    /// License identifiers accepted by the license check (empty = any)
    pub allowed_licenses: Vec<String>,

    /// License identifiers always reported
    pub blocked_licenses: Vec<String>,

    /// Lowest severity that marks a project as having security issues
    pub severity_threshold: Severity,

    // Scheduling hints for hosts; depwise itself never schedules
    pub update_check_interval_minutes: u32,
    pub security_scan_interval_minutes: u32,
    pub auto_check_for_updates: bool,
}

impl Default for DepwiseConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            default_package_manager: DefaultPackageManager::Auto,
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            offline_mode: false,
            cache_timeout_minutes: 30,
            http_timeout_secs: 30,
            registry_requests_per_second: None,
            allowed_licenses: Vec::new(),
            blocked_licenses: Vec::new(),
            severity_threshold: Severity::Moderate,
            update_check_interval_minutes: 60,
            security_scan_interval_minutes: 120,
            auto_check_for_updates: true,
        }
    }
}

impl DepwiseConfig {
    /// Registry client options derived from this config.
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            registry_url: self.registry_url.clone(),
            cache_ttl: Duration::from_secs(self.cache_timeout_minutes.saturating_mul(60)),
            offline: self.offline_mode,
            timeout: Duration::from_secs(self.http_timeout_secs),
            requests_per_second: self.registry_requests_per_second,
        }
    }
}
