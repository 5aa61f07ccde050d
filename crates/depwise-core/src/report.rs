//! Report shapes produced by the analyzers and handed to presentation layers.

use crate::types::{InstalledPackage, Severity, UpdateType, Vulnerability};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vulnerabilities an audit tool reported for one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScanResult {
    pub package_name: String,
    pub vulnerabilities: Vec<Vulnerability>,
}

/// Vulnerability counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
}

impl AuditSummary {
    /// Count a single vulnerability of the given severity.
    pub fn record(&mut self, severity: Severity) {
        self.total += 1;
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Moderate => self.moderate += 1,
            Severity::Low => self.low += 1,
        }
    }

    /// Number of vulnerabilities at or above `threshold`.
    pub fn count_at_least(&self, threshold: Severity) -> usize {
        [
            (Severity::Critical, self.critical),
            (Severity::High, self.high),
            (Severity::Moderate, self.moderate),
            (Severity::Low, self.low),
        ]
        .into_iter()
        .filter(|(severity, _)| *severity >= threshold)
        .map(|(_, count)| count)
        .sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total == 0
    }
}

/// Why a package's license was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationType {
    /// The license is on the blocked list
    Blocked,
    /// An allow list is configured and the license is not on it
    NotAllowed,
}

/// A package whose license fails the configured policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseViolation {
    pub package_name: String,
    pub license: String,
    pub violation_type: ViolationType,
}

/// Update classification counts over a package list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub total: usize,
    pub up_to_date: usize,
    pub patch: usize,
    pub minor: usize,
    pub major: usize,
}

impl UpdateSummary {
    pub fn from_packages(packages: &[InstalledPackage]) -> Self {
        let mut summary = UpdateSummary {
            total: packages.len(),
            ..Default::default()
        };
        for package in packages {
            match package.update_available {
                Some(UpdateType::Major) => summary.major += 1,
                Some(UpdateType::Minor) => summary.minor += 1,
                Some(UpdateType::Patch) => summary.patch += 1,
                Some(UpdateType::None) | None => summary.up_to_date += 1,
            }
        }
        summary
    }

    /// Packages with any update available.
    pub fn outdated(&self) -> usize {
        self.patch + self.minor + self.major
    }
}

/// Update section of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatus {
    pub up_to_date: usize,
    pub minor: usize,
    pub major: usize,
    pub patch: usize,
}

/// Security section of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStatus {
    pub total_vulnerabilities: usize,
    pub critical: usize,
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
}

/// Deprecation section of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationStatus {
    pub total: usize,
}

/// Aggregated view of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub project_name: String,
    pub total_packages: usize,
    pub update_status: UpdateStatus,
    pub security: SecurityStatus,
    pub deprecation: DeprecationStatus,
    /// License name to package count; packages without license data count as `Unknown`
    pub licenses: BTreeMap<String, usize>,
}
