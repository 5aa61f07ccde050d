//! Depwise Core - canonical dependency model and version semantics.
//!
//! Every package-manager adapter in depwise translates its tool's output into
//! the types defined here, and every analyzer consumes only these types:
//!
//! - [`InstalledPackage`]: one declared dependency of a project snapshot
//! - [`DependencyGraph`] / [`DependencyNode`]: the tool-agnostic installed tree
//! - [`Conflict`]: a structural problem found in a graph
//! - [`OutdatedPackage`]: one row of a tool's outdated report
//! - [`Project`]: the record handed to presentation layers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   depwise-cli   │  (User interface)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ depwise-analysis │────▶│ depwise-registry │
//! └────────┬─────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   depwise-pm    │  (npm / yarn / pnpm / bun adapters)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  depwise-core   │  (This crate - shared types)
//! └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use depwise_core::{classify_update, UpdateType};
//!
//! assert_eq!(classify_update("^1.2.3", "2.0.0"), UpdateType::Major);
//! assert_eq!(classify_update("1.2.3", "1.2.3"), UpdateType::None);
//! ```

pub mod error;
pub mod report;
pub mod types;
pub mod version;

pub use error::{Error, Result};
pub use report::{
    AuditSummary, DashboardData, DeprecationStatus, LicenseViolation, SecurityScanResult,
    SecurityStatus, UpdateStatus, UpdateSummary, ViolationType,
};
pub use types::{
    Conflict, ConflictKind, DependencyGraph, DependencyNode, DependencyType, InstalledPackage,
    Nodes, OutdatedPackage, PackageManagerKind, Project, Severity, UpdateType, Vulnerability,
};
pub use version::{
    classify_update, clean_version, compare_versions, normalize_version, parse_version,
    ParsedVersion,
};
