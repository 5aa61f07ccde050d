//! Core types for dependency inventory and analysis.

use crate::error::Error;
use crate::version::{clean_version, normalize_version};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Dependency bucket of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DependencyType {
    /// `dependencies`
    #[serde(rename = "dependencies")]
    Direct,
    /// `devDependencies`
    #[serde(rename = "devDependencies")]
    Development,
    /// `peerDependencies`
    #[serde(rename = "peerDependencies")]
    Peer,
    /// `optionalDependencies`
    #[serde(rename = "optionalDependencies")]
    Optional,
}

impl DependencyType {
    /// All buckets, in manifest listing order.
    pub const ALL: [DependencyType; 4] = [
        DependencyType::Direct,
        DependencyType::Development,
        DependencyType::Peer,
        DependencyType::Optional,
    ];

    /// The manifest key for this bucket.
    pub fn manifest_key(&self) -> &'static str {
        match self {
            DependencyType::Direct => "dependencies",
            DependencyType::Development => "devDependencies",
            DependencyType::Peer => "peerDependencies",
            DependencyType::Optional => "optionalDependencies",
        }
    }

    /// Map a bucket name as printed by a tool (`devDependencies`, `dev`, ...).
    pub fn from_tool_label(label: &str) -> Option<Self> {
        match label.trim() {
            "dependencies" | "prod" | "production" => Some(DependencyType::Direct),
            "devDependencies" | "dev" | "development" => Some(DependencyType::Development),
            "peerDependencies" | "peer" => Some(DependencyType::Peer),
            "optionalDependencies" | "optional" => Some(DependencyType::Optional),
            _ => None,
        }
    }

    /// Whether this is the production bucket.
    pub fn is_production(&self) -> bool {
        matches!(self, DependencyType::Direct)
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

impl FromStr for DependencyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tool_label(s).ok_or_else(|| Error::UnknownDependencyType(s.to_string()))
    }
}

/// Type of version update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    /// Major version bump (1.0.0 -> 2.0.0) - potentially breaking
    Major,
    /// Minor version bump (1.0.0 -> 1.1.0) - new features
    Minor,
    /// Patch version bump (1.0.0 -> 1.0.1) - bug fixes
    Patch,
    /// No update needed - already on latest
    None,
}

impl UpdateType {
    /// Check if this is a breaking change
    pub fn is_breaking(&self) -> bool {
        matches!(self, UpdateType::Major)
    }

    /// Check if an update exists at all
    pub fn is_update(&self) -> bool {
        !matches!(self, UpdateType::None)
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdateType::Major => "major",
            UpdateType::Minor => "minor",
            UpdateType::Patch => "patch",
            UpdateType::None => "none",
        })
    }
}

/// Vulnerability severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    /// Map a severity label from audit output. Unknown or missing labels map to `Low`.
    pub fn from_audit_label(label: Option<&str>) -> Self {
        match label.map(|l| l.to_ascii_lowercase()).as_deref() {
            Some("critical") => Severity::Critical,
            Some("high") => Severity::High,
            Some("moderate") | Some("medium") => Severity::Moderate,
            _ => Severity::Low,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        })
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "moderate" | "medium" => Ok(Severity::Moderate),
            "low" => Ok(Severity::Low),
            _ => Err(Error::UnknownSeverity(s.to_string())),
        }
    }
}

/// A known vulnerability affecting a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    /// Advisory identifier
    pub id: String,
    /// Advisory title
    pub title: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss_score: Option<f64>,
    pub package_name: String,
    /// Affected version range as reported by the audit tool
    pub affected_versions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patched_versions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One declared dependency of a project snapshot.
///
/// Snapshots are rebuilt on every listing; enrichment (registry data,
/// vulnerabilities) produces a new value instead of mutating an old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledPackage {
    pub name: String,
    /// Version range exactly as declared in the manifest
    pub specified_version: String,
    /// Declared range with leading range operators stripped
    pub current_version: String,
    pub dependency_type: DependencyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_available: Option<UpdateType>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerabilities: Option<Vec<Vulnerability>>,
}

impl InstalledPackage {
    /// Build a package from a manifest entry.
    pub fn declared(
        name: impl Into<String>,
        specified_version: impl Into<String>,
        dependency_type: DependencyType,
    ) -> Self {
        let specified_version = specified_version.into();
        Self {
            name: name.into(),
            current_version: clean_version(&specified_version),
            specified_version,
            dependency_type,
            latest_version: None,
            update_available: None,
            is_deprecated: false,
            deprecation_message: None,
            vulnerabilities: None,
        }
    }

    /// Whether a registry check found a newer version.
    pub fn has_update(&self) -> bool {
        self.update_available.is_some_and(|u| u.is_update())
    }

    /// Whether any vulnerability was attached.
    pub fn has_vulnerabilities(&self) -> bool {
        self.vulnerabilities.as_ref().is_some_and(|v| !v.is_empty())
    }
}

/// A node of the installed dependency tree.
///
/// The same `(name, version)` reached through different paths appears as
/// separate nodes; the tree is never interned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub name: String,
    /// Resolved version, or empty when the tool reported none
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyNode>,
    /// Problem reported by the tool (missing, invalid, unmet)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dev: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub peer: bool,
}

impl DependencyNode {
    /// Create a leaf node. Versions that are not numeric-dotted become empty.
    pub fn new(name: impl Into<String>, version: &str) -> Self {
        Self {
            name: name.into(),
            version: normalize_version(version),
            dependencies: Vec::new(),
            error: None,
            dev: false,
            optional: false,
            peer: false,
        }
    }

    /// Attach children.
    pub fn with_dependencies(mut self, dependencies: Vec<DependencyNode>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Attach a tool-reported problem.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// `name@version`, or just the name when the version is unknown.
    pub fn spec(&self) -> String {
        if self.version.is_empty() {
            self.name.clone()
        } else {
            format!("{}@{}", self.name, self.version)
        }
    }
}

/// The installed tree of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<DependencyNode>,
}

impl DependencyGraph {
    /// The graph every adapter falls back to when its tool output is unusable.
    pub fn empty() -> Self {
        Self {
            name: "root".to_string(),
            version: "0.0.0".to_string(),
            dependencies: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Depth-first, pre-order iterator over every node below the root.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: self.dependencies.iter().rev().collect(),
        }
    }

    /// Total number of nodes below the root.
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::empty()
    }
}

/// Iterator returned by [`DependencyGraph::nodes`].
pub struct Nodes<'a> {
    stack: Vec<&'a DependencyNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a DependencyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.dependencies.iter().rev());
        Some(node)
    }
}

/// Kind of structural problem in a dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    VersionMismatch,
    Missing,
    Invalid,
    PeerMismatch,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictKind::VersionMismatch => "version-mismatch",
            ConflictKind::Missing => "missing",
            ConflictKind::Invalid => "invalid",
            ConflictKind::PeerMismatch => "peer-mismatch",
        })
    }
}

/// A structural problem found while analyzing a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub package_name: String,
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One row of a tool's outdated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutdatedPackage {
    pub name: String,
    pub current: String,
    pub wanted: String,
    pub latest: String,
    pub dependency_type: DependencyType,
}

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManagerKind {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManagerKind {
    /// Lockfile detection order.
    pub const DETECTION_ORDER: [PackageManagerKind; 4] = [
        PackageManagerKind::Bun,
        PackageManagerKind::Pnpm,
        PackageManagerKind::Yarn,
        PackageManagerKind::Npm,
    ];

    /// Executable invoked for this manager.
    pub fn binary(&self) -> &'static str {
        match self {
            PackageManagerKind::Npm => "npm",
            PackageManagerKind::Yarn => "yarn",
            PackageManagerKind::Pnpm => "pnpm",
            PackageManagerKind::Bun => "bun",
        }
    }

    /// Lockfile whose presence signals this manager.
    pub fn lockfile_name(&self) -> &'static str {
        match self {
            PackageManagerKind::Npm => "package-lock.json",
            PackageManagerKind::Yarn => "yarn.lock",
            PackageManagerKind::Pnpm => "pnpm-lock.yaml",
            PackageManagerKind::Bun => "bun.lockb",
        }
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

impl FromStr for PackageManagerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "npm" => Ok(PackageManagerKind::Npm),
            "yarn" => Ok(PackageManagerKind::Yarn),
            "pnpm" => Ok(PackageManagerKind::Pnpm),
            "bun" => Ok(PackageManagerKind::Bun),
            _ => Err(Error::UnknownPackageManager(s.to_string())),
        }
    }
}

/// A detected project, as handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Stable identifier derived from the project path
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub manifest_path: PathBuf,
    pub package_manager: PackageManagerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lockfile_path: Option<PathBuf>,
    pub packages: Vec<InstalledPackage>,
    pub last_updated: DateTime<Utc>,
    pub has_security_issues: bool,
    pub has_updates: bool,
}
