use perch_config::PerchConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
dataset_path: "data/urls.csv"
scratch_path: "data/scratch.jpg"
auth_failure_fatal: true
credentials:
  api_key: "ck"
  api_secret_key: "cs"
  access_token: "at"
  access_token_secret: "as"
  "#;
    let p = write_yaml(&tmp, "perch.yaml", file_yaml);

    let config = PerchConfigLoader::new()
        .with_file(p)
        .load()
        .expect("load bot config");

    assert_eq!(config.dataset_path, "data/urls.csv");
    assert_eq!(config.scratch_path, "data/scratch.jpg");
    assert!(config.auth_failure_fatal);
    assert_eq!(config.credentials.api_key, "ck");
    assert_eq!(config.credentials.access_token_secret, "as");
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();

    let config = PerchConfigLoader::new()
        .with_file(tmp.path().join("does-not-exist.yaml"))
        .load()
        .expect("defaults without a file");

    assert_eq!(config.dataset_path, "bird_data/bird_urls.csv");
    assert_eq!(config.scratch_path, "bird_data/bird.jpg");
    assert!(!config.auth_failure_fatal);
}
