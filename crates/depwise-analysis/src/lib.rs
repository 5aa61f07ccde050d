//! Analysis over depwise's canonical dependency model.
//!
//! Graph-based analyses ([`GraphBuilder`], [`ConflictDetector`],
//! [`UnusedDependencyAnalyzer`]) work through a
//! [`PackageManager`](depwise_pm::PackageManager). Registry-backed ones
//! ([`UpdateChecker`], [`LicenseChecker`], [`AnalyticsAggregator`]) take any
//! [`MetadataSource`](depwise_registry::MetadataSource), so they can run
//! against fixed data.

pub mod aggregator;
pub mod conflicts;
pub mod error;
pub mod graph;
pub mod license;
pub mod security;
pub mod unused;
pub mod updates;

pub use aggregator::{AnalyticsAggregator, UNKNOWN_LICENSE};
pub use conflicts::{find_conflicts, ConflictDetector, ConflictReport};
pub use error::{Error, Result};
pub use graph::GraphBuilder;
pub use license::{CancellationFlag, LicenseChecker, LicensePolicy, LICENSE_BATCH_SIZE};
pub use security::{attach_vulnerabilities, parse_npm_audit, parse_yarn_audit, summary, SecurityScanner};
pub use unused::{extract_imports, package_name_from_import, UnusedDependencyAnalyzer, SOURCE_EXTENSIONS};
pub use updates::{update_summary, UpdateChecker};
