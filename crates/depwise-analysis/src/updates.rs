//! Registry-backed update checks.

use depwise_core::{classify_update, InstalledPackage, UpdateSummary};
use depwise_registry::MetadataSource;
use futures::future::join_all;
use std::sync::Arc;

/// Compares installed versions against the registry's `latest` tag.
pub struct UpdateChecker {
    registry: Arc<dyn MetadataSource>,
}

impl UpdateChecker {
    pub fn new(registry: Arc<dyn MetadataSource>) -> Self {
        Self { registry }
    }

    /// A new snapshot with `latest_version` and `update_available` filled in.
    ///
    /// All lookups run concurrently. Packages the registry does not know
    /// come back unchanged.
    pub async fn check_updates(&self, packages: &[InstalledPackage]) -> Vec<InstalledPackage> {
        join_all(packages.iter().map(|pkg| self.check_latest(pkg))).await
    }

    async fn check_latest(&self, pkg: &InstalledPackage) -> InstalledPackage {
        let Some(registry_pkg) = self.registry.get_package(&pkg.name).await else {
            return pkg.clone();
        };
        let Some(latest) = registry_pkg.latest_version() else {
            return pkg.clone();
        };
        with_latest(pkg, latest)
    }

    /// Like [`check_updates`](Self::check_updates) for one package, also
    /// reporting whether the latest version is deprecated.
    pub async fn check_single_package(&self, pkg: &InstalledPackage) -> InstalledPackage {
        let Some(registry_pkg) = self.registry.get_package(&pkg.name).await else {
            return pkg.clone();
        };
        let Some(latest) = registry_pkg.latest_version() else {
            return pkg.clone();
        };

        let deprecation = registry_pkg.deprecation_of(latest).map(String::from);
        InstalledPackage {
            is_deprecated: deprecation.is_some(),
            deprecation_message: deprecation,
            ..with_latest(pkg, latest)
        }
    }
}

fn with_latest(pkg: &InstalledPackage, latest: &str) -> InstalledPackage {
    let update = classify_update(&pkg.current_version, latest);
    InstalledPackage {
        latest_version: Some(latest.to_string()),
        update_available: update.is_update().then_some(update),
        ..pkg.clone()
    }
}

/// Counts by update classification.
pub fn update_summary(packages: &[InstalledPackage]) -> UpdateSummary {
    UpdateSummary::from_packages(packages)
}
