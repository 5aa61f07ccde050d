//! Unused production dependency detection by static import scanning.
//!
//! Sources are scanned textually, not parsed. Dynamic `require` targets,
//! string-built paths and type-only packages are not understood, so the
//! result can contain false positives.

use crate::Result;
use depwise_fs::{DiscoveryOptions, FileMatch};
use depwise_pm::PackageManager;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// File extensions scanned for imports.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".vue", ".svelte",
];

static IMPORT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // import x from 'pkg' / import { a, b } from 'pkg'
        r#"import\s+[^;'"]*?\s*from\s*['"]([^'"]+)['"]"#,
        // import 'pkg'
        r#"import\s*['"]([^'"]+)['"]"#,
        // import('pkg')
        r#"import\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
        // require('pkg')
        r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
        // export { x } from 'pkg' / export * from 'pkg'
        r#"export\s+[^;'"]*?\s*from\s*['"]([^'"]+)['"]"#,
    ]
    .into_iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Every import/require target in `source`, in no particular order.
pub fn extract_imports(source: &str) -> Vec<&str> {
    IMPORT_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(source))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// The package an import target resolves to.
///
/// Relative and absolute paths have none. `@scope/name/sub` resolves to
/// `@scope/name`, `name/sub` to `name`.
pub fn package_name_from_import(target: &str) -> Option<&str> {
    if target.starts_with('.') || target.starts_with('/') {
        return None;
    }

    if target.starts_with('@') {
        let mut slashes = target.match_indices('/').map(|(i, _)| i);
        let first = slashes.next()?;
        if first + 1 == target.len() {
            return None;
        }
        Some(match slashes.next() {
            Some(second) => &target[..second],
            None => target,
        })
    } else {
        target.split('/').next().filter(|name| !name.is_empty())
    }
}

/// Finds production dependencies that no source file imports.
pub struct UnusedDependencyAnalyzer<'a> {
    package_manager: &'a dyn PackageManager,
}

impl<'a> UnusedDependencyAnalyzer<'a> {
    pub fn new(package_manager: &'a dyn PackageManager) -> Self {
        Self { package_manager }
    }

    /// Names of declared `dependencies` never imported, in manifest order.
    ///
    /// # Errors
    /// Returns an error if the manifest cannot be listed or the project
    /// directory cannot be walked.
    pub async fn find_unused_dependencies(&self) -> Result<Vec<String>> {
        let production: Vec<String> = self
            .package_manager
            .list()
            .await?
            .into_iter()
            .filter(|pkg| pkg.dependency_type.is_production())
            .map(|pkg| pkg.name)
            .collect();
        if production.is_empty() {
            return Ok(Vec::new());
        }

        let used = self.scan_for_imports().await?;
        Ok(production
            .into_iter()
            .filter(|name| !used.contains(name))
            .collect())
    }

    /// Package names imported anywhere in the project's sources.
    pub async fn scan_for_imports(&self) -> Result<HashSet<String>> {
        let ctx = self.package_manager.context();
        let options = DiscoveryOptions {
            include_hidden: true,
            ..Default::default()
        };
        let files = ctx
            .fs
            .discover_files(
                ctx.project_root(),
                FileMatch::Extensions(SOURCE_EXTENSIONS),
                &options,
            )
            .await?;

        let mut used = HashSet::new();
        for file in &files {
            let source = match ctx.fs.read_to_string(file).await {
                Ok(source) => source,
                Err(err) => {
                    tracing::debug!(path = %file.display(), error = %err, "Skipping unreadable source");
                    continue;
                }
            };
            used.extend(
                extract_imports(&source)
                    .into_iter()
                    .filter_map(package_name_from_import)
                    .map(String::from),
            );
        }

        tracing::debug!(files = files.len(), packages = used.len(), "Scanned imports");
        Ok(used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_import_forms() {
        let source = r#"
import React from 'react';
import { useState,
  useEffect } from "react-dom/client";
import type { Config } from '@acme/config/types';
import './styles.css';
import 'reflect-metadata';
const lazy = import('chart.js');
const fs = require('fs-extra');
export * from '@scope/utils';
export { default as Button } from "./Button";
"#;
        let mut targets = extract_imports(source);
        targets.sort_unstable();
        assert_eq!(
            targets,
            vec![
                "./Button",
                "./styles.css",
                "@acme/config/types",
                "@scope/utils",
                "chart.js",
                "fs-extra",
                "react",
                "react-dom/client",
                "reflect-metadata",
            ]
        );
    }

    #[test]
    fn test_package_name_from_import() {
        assert_eq!(package_name_from_import("react/jsx-runtime"), Some("react"));
        assert_eq!(package_name_from_import("lodash"), Some("lodash"));
        assert_eq!(package_name_from_import("@types/node"), Some("@types/node"));
        assert_eq!(package_name_from_import("@mui/material/Button"), Some("@mui/material"));
        assert_eq!(package_name_from_import("@scope"), None);
        assert_eq!(package_name_from_import("@scope/"), None);
        assert_eq!(package_name_from_import("./local"), None);
        assert_eq!(package_name_from_import("../up"), None);
        assert_eq!(package_name_from_import("/abs/path"), None);
    }

    #[test]
    fn test_no_imports_in_plain_text() {
        assert!(extract_imports("const important = 'from here';").is_empty());
    }
}
