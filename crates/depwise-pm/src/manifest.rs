//! `package.json` reading and bucket rewriting.

use crate::error::{Error, Result};
use crate::update::FileUpdater;
use depwise_core::{DependencyType, InstalledPackage};
use depwise_fs::FileSystem;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of the manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Typed view over the manifest fields depwise reads.
///
/// Buckets keep only string values; anything else in a bucket is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license: Option<Value>,
    #[serde(default)]
    pub package_manager: Option<String>,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, String>,
}

/// A loaded manifest.
///
/// The document is held as an ordered JSON map so a rewrite keeps every
/// field, and the original key order, that depwise does not touch.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    path: PathBuf,
    document: Map<String, Value>,
}

impl Manifest {
    /// Read and parse the manifest at `path`.
    ///
    /// # Errors
    /// `ManifestNotFound` if the file is missing, `Json` if it does not parse,
    /// `InvalidManifest` if the top level is not an object.
    pub async fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let text = fs.read_to_string(path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Error::ManifestNotFound(path.to_path_buf())
            } else {
                Error::Io(err)
            }
        })?;
        Self::parse(path, &text)
    }

    /// Parse manifest text. `path` is only used for error messages and saving.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Object(document) => Ok(Self {
                path: path.to_path_buf(),
                document,
            }),
            _ => Err(Error::InvalidManifest {
                path: path.to_path_buf(),
                reason: "top level is not an object".to_string(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw document.
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn name(&self) -> Option<&str> {
        self.document.get("name").and_then(Value::as_str)
    }

    /// The `packageManager` field, e.g. `pnpm@9.1.0`.
    pub fn package_manager_field(&self) -> Option<&str> {
        self.document.get("packageManager").and_then(Value::as_str)
    }

    /// Typed view of the known fields. Fields with an unexpected shape are
    /// dropped rather than failing the whole view.
    pub fn package_json(&self) -> PackageJson {
        let string = |key: &str| {
            self.document
                .get(key)
                .and_then(Value::as_str)
                .map(String::from)
        };
        let string_map = |key: &str| -> BTreeMap<String, String> {
            self.document
                .get(key)
                .and_then(Value::as_object)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                        .collect()
                })
                .unwrap_or_default()
        };

        PackageJson {
            name: string("name"),
            version: string("version"),
            license: self.document.get("license").cloned(),
            package_manager: string("packageManager"),
            scripts: string_map("scripts"),
            dependencies: string_map("dependencies"),
            dev_dependencies: string_map("devDependencies"),
            peer_dependencies: string_map("peerDependencies"),
            optional_dependencies: string_map("optionalDependencies"),
        }
    }

    /// Declared `(name, range)` pairs of one bucket, in manifest order.
    pub fn dependencies(&self, bucket: DependencyType) -> impl Iterator<Item = (&str, &str)> {
        self.document
            .get(bucket.manifest_key())
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|entries| entries.iter())
            .filter_map(|(name, range)| range.as_str().map(|range| (name.as_str(), range)))
    }

    /// One package per declared entry across all four buckets.
    pub fn installed_packages(&self) -> Vec<InstalledPackage> {
        DependencyType::ALL
            .iter()
            .flat_map(|&bucket| {
                self.dependencies(bucket)
                    .map(move |(name, range)| InstalledPackage::declared(name, range, bucket))
            })
            .collect()
    }

    /// Move `name` from one bucket to another, keeping its range verbatim.
    ///
    /// An emptied source bucket is removed. The destination bucket is
    /// created at the end of the document if it does not exist, and the
    /// entry is appended to it. Moving into the same bucket changes nothing.
    pub fn move_dependency(
        &mut self,
        name: &str,
        from: DependencyType,
        to: DependencyType,
    ) -> Result<()> {
        if from == to {
            if self.dependencies(from).any(|(declared, _)| declared == name) {
                return Ok(());
            }
            return Err(Error::PackageNotFound {
                name: name.to_string(),
                bucket: from,
            });
        }

        let source = self
            .document
            .get_mut(from.manifest_key())
            .and_then(Value::as_object_mut)
            .ok_or(Error::BucketNotFound { bucket: from })?;

        let range = source
            .shift_remove(name)
            .ok_or_else(|| Error::PackageNotFound {
                name: name.to_string(),
                bucket: from,
            })?;

        if source.is_empty() {
            self.document.shift_remove(from.manifest_key());
        }

        let target = self
            .document
            .entry(to.manifest_key())
            .or_insert_with(|| Value::Object(Map::new()));

        match target.as_object_mut() {
            Some(target) => {
                target.insert(name.to_string(), range);
                Ok(())
            }
            None => Err(Error::InvalidManifest {
                path: self.path.clone(),
                reason: format!("{} is not an object", to.manifest_key()),
            }),
        }
    }

    /// Two-space indented JSON with a trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut text =
            serde_json::to_string_pretty(&self.document).map_err(|source| Error::Json {
                path: self.path.clone(),
                source,
            })?;
        text.push('\n');
        Ok(text)
    }

    /// Write the manifest back to its path.
    pub async fn save(&self, fs: &dyn FileSystem) -> Result<()> {
        let text = self.to_json_string()?;
        FileUpdater.update_file(fs, &self.path, &text).await
    }
}
