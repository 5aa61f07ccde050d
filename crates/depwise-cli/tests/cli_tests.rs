//! End-to-end runs of the `depwise` binary on commands that only touch
//! the manifest and the config file.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MANIFEST: &str = r#"{
  "name": "web",
  "private": true,
  "dependencies": {
    "lodash": "^4.17.21",
    "react": "^18.2.0"
  },
  "devDependencies": {
    "typescript": "5.4.5"
  }
}
"#;

fn depwise(args: &[&str], config: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_depwise"))
        .args(args)
        .arg("--config")
        .arg(config)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("package.json"), MANIFEST).unwrap();
    dir
}

#[test]
fn test_list_json() {
    let dir = project();
    let config = dir.path().join("missing.toml");
    let out = depwise(&["list", "--json", "--path", dir.path().to_str().unwrap()], &config);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let packages: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = packages
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["lodash", "react", "typescript"]);
    assert_eq!(packages[2]["dependencyType"], "devDependencies");
}

#[test]
fn test_move_rewrites_manifest() {
    let dir = project();
    let config = dir.path().join("missing.toml");
    let path = dir.path().to_str().unwrap();

    let out = depwise(
        &["move", "lodash", "--from", "dependencies", "--to", "devDependencies", "--path", path],
        &config,
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("package.json")).unwrap())
            .unwrap();
    assert!(manifest["dependencies"].get("lodash").is_none());
    assert_eq!(manifest["devDependencies"]["lodash"], "^4.17.21");
    assert_eq!(manifest["private"], true);
}

#[test]
fn test_move_missing_package_fails() {
    let dir = project();
    let config = dir.path().join("missing.toml");
    let out = depwise(
        &["move", "vue", "--from", "dependencies", "--to", "devDependencies", "--path", dir.path().to_str().unwrap()],
        &config,
    );
    assert!(!out.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("package.json")).unwrap(), MANIFEST);
}

#[test]
fn test_missing_manifest_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("missing.toml");
    let out = depwise(&["list", "--path", dir.path().to_str().unwrap()], &config);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("package.json"));
}

#[test]
fn test_projects_skips_node_modules() {
    let dir = project();
    let nested = dir.path().join("packages").join("ui");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("package.json"), r#"{ "name": "ui" }"#).unwrap();
    fs::write(nested.join("yarn.lock"), "").unwrap();
    let vendored = dir.path().join("node_modules").join("react");
    fs::create_dir_all(&vendored).unwrap();
    fs::write(vendored.join("package.json"), r#"{ "name": "react" }"#).unwrap();

    let config = dir.path().join("missing.toml");
    let out = depwise(&["projects", "--json", "--path", dir.path().to_str().unwrap()], &config);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let projects: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let mut found: Vec<(String, String)> = projects
        .as_array()
        .unwrap()
        .iter()
        .map(|p| {
            (
                p["name"].as_str().unwrap().to_string(),
                p["packageManager"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            ("ui".to_string(), "yarn".to_string()),
            ("web".to_string(), "npm".to_string()),
        ]
    );
}

#[test]
fn test_config_init_and_show() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("depwise").join("config.toml");

    let out = depwise(&["config", "init"], &config);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(config.exists());

    let out = depwise(&["config", "show", "--json"], &config);
    let shown: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(shown["default_package_manager"], "auto");
    assert_eq!(shown["cache_timeout_minutes"], 30);

    let out = depwise(&["config", "path"], &config);
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        config.display().to_string()
    );
}
