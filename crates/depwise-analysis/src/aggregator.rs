//! Dashboard aggregation for one project.

use depwise_core::{DashboardData, Project, Severity, UpdateType};
use depwise_registry::MetadataSource;
use std::sync::Arc;

/// License bucket for packages without license data.
pub const UNKNOWN_LICENSE: &str = "Unknown";

pub struct AnalyticsAggregator {
    registry: Arc<dyn MetadataSource>,
}

impl AnalyticsAggregator {
    pub fn new(registry: Arc<dyn MetadataSource>) -> Self {
        Self { registry }
    }

    /// Summarize a project's current snapshot.
    ///
    /// Update and security counts come from the snapshot as-is; run the
    /// update checker and security scanner first to populate them. License
    /// names are looked up through the registry (usually already cached).
    pub async fn aggregate(&self, project: &Project) -> DashboardData {
        let mut data = DashboardData {
            project_name: project.name.clone(),
            total_packages: project.packages.len(),
            ..Default::default()
        };

        for pkg in &project.packages {
            match pkg.update_available {
                Some(UpdateType::Major) => data.update_status.major += 1,
                Some(UpdateType::Minor) => data.update_status.minor += 1,
                Some(UpdateType::Patch) => data.update_status.patch += 1,
                Some(UpdateType::None) | None => data.update_status.up_to_date += 1,
            }

            for vulnerability in pkg.vulnerabilities.iter().flatten() {
                let security = &mut data.security;
                security.total_vulnerabilities += 1;
                match vulnerability.severity {
                    Severity::Critical => security.critical += 1,
                    Severity::High => security.high += 1,
                    Severity::Moderate => security.moderate += 1,
                    Severity::Low => security.low += 1,
                }
            }

            if pkg.is_deprecated {
                data.deprecation.total += 1;
            }

            let license = self
                .registry
                .get_package(&pkg.name)
                .await
                .and_then(|registry_pkg| registry_pkg.license_name())
                .unwrap_or_else(|| UNKNOWN_LICENSE.to_string());
            *data.licenses.entry(license).or_insert(0) += 1;
        }

        data
    }
}
