//! Vulnerability scanning through the tools' audit commands.

use depwise_core::{
    AuditSummary, InstalledPackage, PackageManagerKind, SecurityScanResult, Severity,
    Vulnerability,
};
use depwise_pm::CommandRunner;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Runs `<tool> audit --json` and maps the findings per package.
pub struct SecurityScanner {
    runner: Arc<dyn CommandRunner>,
}

impl SecurityScanner {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Audit the project at `project_root`. bun has no audit of its own and
    /// is scanned with npm. Any failure yields no results.
    pub async fn scan(&self, project_root: &Path, kind: PackageManagerKind) -> Vec<SecurityScanResult> {
        let program = match kind {
            PackageManagerKind::Yarn => "yarn",
            PackageManagerKind::Pnpm => "pnpm",
            PackageManagerKind::Npm | PackageManagerKind::Bun => "npm",
        };
        let args = ["audit".to_string(), "--json".to_string()];

        let output = match self.runner.run(program, &args, project_root).await {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!(manager = %kind, error = %err, "Audit could not run");
                return Vec::new();
            }
        };

        match kind {
            PackageManagerKind::Yarn => parse_yarn_audit(&output.stdout),
            PackageManagerKind::Pnpm => parse_npm_audit(&output.stdout),
            PackageManagerKind::Npm | PackageManagerKind::Bun => {
                let text = if output.stdout.trim().is_empty() {
                    &output.stderr
                } else {
                    &output.stdout
                };
                parse_npm_audit(text)
            }
        }
    }
}

/// Parse the npm (v7+) audit report, which pnpm also emits.
///
/// Only advisory entries of `via` become vulnerabilities; string entries
/// just name the vulnerable dependency that pulls this package in.
pub fn parse_npm_audit(output: &str) -> Vec<SecurityScanResult> {
    let data: Value = match serde_json::from_str(output.trim()) {
        Ok(data) => data,
        Err(err) => {
            if !output.trim().is_empty() {
                tracing::debug!(error = %err, "Unparseable audit report");
            }
            return Vec::new();
        }
    };

    let Some(entries) = data.get("vulnerabilities").and_then(Value::as_object) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|(name, entry)| {
            let vulnerabilities: Vec<Vulnerability> = entry
                .get("via")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter(|via| via.is_object() && text(via, "title").is_some())
                .map(|via| npm_vulnerability(name, entry, via))
                .collect();

            (!vulnerabilities.is_empty()).then(|| SecurityScanResult {
                package_name: name.clone(),
                vulnerabilities,
            })
        })
        .collect()
}

fn npm_vulnerability(name: &str, entry: &Value, via: &Value) -> Vulnerability {
    let id = match via.get("source") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => format!("{name}-vuln"),
    };

    Vulnerability {
        id,
        title: text(via, "title").unwrap_or_default().to_string(),
        severity: Severity::from_audit_label(text(via, "severity").or(text(entry, "severity"))),
        cvss_score: via
            .get("cvss")
            .and_then(|cvss| cvss.get("score"))
            .and_then(Value::as_f64)
            .filter(|score| *score > 0.0),
        package_name: name.to_string(),
        affected_versions: text(via, "range")
            .or(text(entry, "range"))
            .unwrap_or_default()
            .to_string(),
        patched_versions: None,
        recommendation: fix_recommendation(entry.get("fixAvailable")),
        url: text(via, "url").map(String::from),
    }
}

fn fix_recommendation(fix: Option<&Value>) -> Option<String> {
    match fix? {
        Value::Bool(true) => Some("Run audit fix".to_string()),
        Value::Object(fix) => {
            let name = fix.get("name").and_then(Value::as_str)?;
            let version = fix.get("version").and_then(Value::as_str)?;
            let breaking = fix
                .get("isSemVerMajor")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Some(if breaking {
                format!("Upgrade to {name}@{version} (breaking)")
            } else {
                format!("Upgrade to {name}@{version}")
            })
        }
        _ => None,
    }
}

/// Parse `yarn audit --json`: one `auditAdvisory` record per vulnerable path.
///
/// The same advisory reached through several paths is reported once.
pub fn parse_yarn_audit(output: &str) -> Vec<SecurityScanResult> {
    let mut results: Vec<SecurityScanResult> = Vec::new();

    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        let Ok(record) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        if text(&record, "type") != Some("auditAdvisory") {
            continue;
        }
        let Some(advisory) = record.get("data").and_then(|d| d.get("advisory")) else {
            continue;
        };
        let Some(package_name) = text(advisory, "module_name") else {
            continue;
        };

        let id = match advisory.get("id") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => format!("{package_name}-vuln"),
        };
        let vulnerability = Vulnerability {
            id,
            title: text(advisory, "title").unwrap_or_default().to_string(),
            severity: Severity::from_audit_label(text(advisory, "severity")),
            cvss_score: advisory
                .get("cvss")
                .and_then(|cvss| cvss.get("score"))
                .and_then(Value::as_f64),
            package_name: package_name.to_string(),
            affected_versions: text(advisory, "vulnerable_versions")
                .unwrap_or_default()
                .to_string(),
            patched_versions: text(advisory, "patched_versions").map(String::from),
            recommendation: text(advisory, "recommendation").map(String::from),
            url: text(advisory, "url").map(String::from),
        };

        match results.iter_mut().find(|r| r.package_name == package_name) {
            Some(result) => {
                if !result.vulnerabilities.iter().any(|v| v.id == vulnerability.id) {
                    result.vulnerabilities.push(vulnerability);
                }
            }
            None => results.push(SecurityScanResult {
                package_name: package_name.to_string(),
                vulnerabilities: vec![vulnerability],
            }),
        }
    }

    results
}

fn text<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Counts by severity across all results.
pub fn summary(results: &[SecurityScanResult]) -> AuditSummary {
    let mut summary = AuditSummary::default();
    for vulnerability in results.iter().flat_map(|r| &r.vulnerabilities) {
        summary.record(vulnerability.severity);
    }
    summary
}

/// A new snapshot with each package's findings attached.
pub fn attach_vulnerabilities(
    packages: &[InstalledPackage],
    results: &[SecurityScanResult],
) -> Vec<InstalledPackage> {
    packages
        .iter()
        .map(|pkg| {
            let found = results
                .iter()
                .find(|r| r.package_name == pkg.name)
                .map(|r| r.vulnerabilities.clone());
            InstalledPackage {
                vulnerabilities: found.or_else(|| pkg.vulnerabilities.clone()),
                ..pkg.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NPM_AUDIT: &str = r#"{
  "auditReportVersion": 2,
  "vulnerabilities": {
    "minimist": {
      "name": "minimist",
      "severity": "critical",
      "isDirect": false,
      "via": [
        {
          "source": 1096436,
          "name": "minimist",
          "dependency": "minimist",
          "title": "Prototype Pollution in minimist",
          "url": "https://github.com/advisories/GHSA-xvch-5gv4-984h",
          "severity": "critical",
          "cvss": { "score": 9.8, "vectorString": "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H" },
          "range": "<0.2.4"
        }
      ],
      "effects": ["mkdirp"],
      "range": "<=0.2.3",
      "fixAvailable": true
    },
    "mkdirp": {
      "name": "mkdirp",
      "severity": "critical",
      "via": ["minimist"],
      "effects": [],
      "range": "0.4.1 - 0.5.1",
      "fixAvailable": { "name": "mkdirp", "version": "0.5.6", "isSemVerMajor": false }
    },
    "semver": {
      "name": "semver",
      "severity": "moderate",
      "via": [
        { "source": 1101088, "title": "semver vulnerable to Regular Expression Denial of Service", "url": "https://github.com/advisories/GHSA-c2qf-rxjj-qqgw", "range": ">=7.0.0 <7.5.2" }
      ],
      "range": "7.0.0 - 7.5.1",
      "fixAvailable": { "name": "semver", "version": "7.6.0", "isSemVerMajor": true }
    }
  },
  "metadata": { "vulnerabilities": { "critical": 2, "moderate": 1, "total": 3 } }
}"#;

    #[test]
    fn test_parse_npm_audit() {
        let results = parse_npm_audit(NPM_AUDIT);
        assert_eq!(results.len(), 2);

        let minimist = &results[0];
        assert_eq!(minimist.package_name, "minimist");
        let vuln = &minimist.vulnerabilities[0];
        assert_eq!(vuln.id, "1096436");
        assert_eq!(vuln.severity, Severity::Critical);
        assert_eq!(vuln.affected_versions, "<0.2.4");
        assert_eq!(vuln.cvss_score, Some(9.8));
        assert_eq!(vuln.recommendation.as_deref(), Some("Run audit fix"));

        let semver = &results[1];
        let vuln = &semver.vulnerabilities[0];
        assert_eq!(vuln.severity, Severity::Moderate, "falls back to the entry severity");
        assert_eq!(
            vuln.recommendation.as_deref(),
            Some("Upgrade to semver@7.6.0 (breaking)")
        );
    }

    #[test]
    fn test_parse_npm_audit_degrades() {
        assert!(parse_npm_audit("").is_empty());
        assert!(parse_npm_audit("npm ERR! audit endpoint returned an error").is_empty());
        assert!(parse_npm_audit(r#"{"error": {"code": "ENOLOCK"}}"#).is_empty());
    }

    #[test]
    fn test_parse_yarn_audit_groups_and_dedupes() {
        let output = concat!(
            r#"{"type":"auditAdvisory","data":{"resolution":{"id":1523,"path":"a>lodash"},"advisory":{"id":1523,"module_name":"lodash","title":"Prototype Pollution","severity":"high","vulnerable_versions":"<4.17.19","patched_versions":">=4.17.19","recommendation":"Upgrade to version 4.17.19 or later","url":"https://npmjs.com/advisories/1523"}}}"#,
            "\n",
            r#"{"type":"auditAdvisory","data":{"resolution":{"id":1523,"path":"b>lodash"},"advisory":{"id":1523,"module_name":"lodash","title":"Prototype Pollution","severity":"high","vulnerable_versions":"<4.17.19","patched_versions":">=4.17.19"}}}"#,
            "\n",
            r#"{"type":"auditAdvisory","data":{"advisory":{"id":1673,"module_name":"lodash","title":"Command Injection","severity":"medium","vulnerable_versions":"<4.17.21"}}}"#,
            "\n",
            r#"{"type":"auditSummary","data":{"vulnerabilities":{"high":2,"moderate":1}}}"#,
            "\n",
        );
        let results = parse_yarn_audit(output);

        assert_eq!(results.len(), 1);
        let lodash = &results[0];
        assert_eq!(lodash.vulnerabilities.len(), 2);
        assert_eq!(lodash.vulnerabilities[0].patched_versions.as_deref(), Some(">=4.17.19"));
        assert_eq!(lodash.vulnerabilities[1].severity, Severity::Moderate);
    }

    #[test]
    fn test_summary_and_attach() {
        let results = parse_npm_audit(NPM_AUDIT);
        let counts = summary(&results);
        assert_eq!(counts.total, 2);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.moderate, 1);
        assert_eq!(counts.count_at_least(Severity::High), 1);

        let packages = vec![
            InstalledPackage::declared("semver", "^7.5.0", depwise_core::DependencyType::Direct),
            InstalledPackage::declared("zod", "^3.0.0", depwise_core::DependencyType::Direct),
        ];
        let attached = attach_vulnerabilities(&packages, &results);
        assert!(attached[0].has_vulnerabilities());
        assert!(!attached[1].has_vulnerabilities());
        assert!(packages[0].vulnerabilities.is_none());
    }
}
