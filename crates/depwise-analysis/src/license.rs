//! License policy checks.

use depwise_core::{InstalledPackage, LicenseViolation, ViolationType};
use depwise_registry::MetadataSource;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Number of registry lookups in flight at once.
pub const LICENSE_BATCH_SIZE: usize = 5;

/// Cooperative cancellation, checked between license batches.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Allowed and blocked license identifiers, compared verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePolicy {
    #[serde(default)]
    pub allowed: Vec<String>,
    #[serde(default)]
    pub blocked: Vec<String>,
}

impl LicensePolicy {
    pub fn new(allowed: Vec<String>, blocked: Vec<String>) -> Self {
        Self { allowed, blocked }
    }

    /// A policy with no lists accepts everything.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty() && self.blocked.is_empty()
    }

    /// How `license` violates the policy, if it does. Blocked wins.
    pub fn evaluate(&self, license: &str) -> Option<ViolationType> {
        if self.blocked.iter().any(|b| b == license) {
            Some(ViolationType::Blocked)
        } else if !self.allowed.is_empty() && !self.allowed.iter().any(|a| a == license) {
            Some(ViolationType::NotAllowed)
        } else {
            None
        }
    }
}

/// Looks up each package's license and applies a [`LicensePolicy`].
pub struct LicenseChecker {
    registry: Arc<dyn MetadataSource>,
}

impl LicenseChecker {
    pub fn new(registry: Arc<dyn MetadataSource>) -> Self {
        Self { registry }
    }

    /// Violations among `packages`.
    ///
    /// Lookups run [`LICENSE_BATCH_SIZE`] at a time, each batch finishing
    /// before the next starts. Cancellation is checked before every batch;
    /// violations found so far are returned. Packages whose license is
    /// unknown are skipped.
    pub async fn check_licenses(
        &self,
        packages: &[InstalledPackage],
        policy: &LicensePolicy,
        cancel: &CancellationFlag,
    ) -> Vec<LicenseViolation> {
        if policy.is_empty() {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for (index, batch) in packages.chunks(LICENSE_BATCH_SIZE).enumerate() {
            if cancel.is_cancelled() {
                tracing::debug!(
                    checked = index * LICENSE_BATCH_SIZE,
                    total = packages.len(),
                    "License check cancelled"
                );
                break;
            }

            let found = join_all(batch.iter().map(|pkg| self.check_package(pkg, policy))).await;
            violations.extend(found.into_iter().flatten());
        }
        violations
    }

    async fn check_package(
        &self,
        pkg: &InstalledPackage,
        policy: &LicensePolicy,
    ) -> Option<LicenseViolation> {
        let license = self.registry.get_package(&pkg.name).await?.license_name()?;
        let violation_type = policy.evaluate(&license)?;
        Some(LicenseViolation {
            package_name: pkg.name.clone(),
            license,
            violation_type,
        })
    }
}
