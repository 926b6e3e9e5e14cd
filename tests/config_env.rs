use std::env;
use std::fs;
use std::path::PathBuf;

use content_id::Codec;
use excavator_cli::{load_config, ConfigError};
use pretty_assertions::assert_eq;
use serial_test::serial;
use tempfile::TempDir;

struct EnvGuard(Vec<&'static str>);

impl EnvGuard {
    fn set(pairs: &[(&'static str, &str)]) -> Self {
        for (key, value) in pairs {
            env::set_var(key, value);
        }
        Self(pairs.iter().map(|(key, _)| *key).collect())
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.0 {
            env::remove_var(key);
        }
    }
}

#[tokio::test]
#[serial]
async fn environment_overrides_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("excavator.yaml");
    fs::write(
        &path,
        "excavate:\n  maxDepth: 4\n  maxArraySample: 5\nhash:\n  codec: dag-pb\n",
    )
    .unwrap();
    let _guard = EnvGuard::set(&[
        ("EXCAVATOR__EXCAVATE__MAX_DEPTH", "9"),
        ("EXCAVATOR__LIVE__BATCH_LIMIT", "4"),
        ("EXCAVATOR__OUTPUT_DIR", "reports"),
    ]);

    let loaded = load_config(Some(&path)).await.unwrap();
    assert!(loaded.from_file);
    let config = loaded.config;
    assert_eq!(config.excavate.max_depth, 9);
    assert_eq!(config.excavate.max_array_sample, 5);
    assert_eq!(config.hash.codec, Codec::DagPb);
    assert_eq!(config.live.batch_limit, 4);
    assert_eq!(config.live.scan_budget(), 16);
    assert_eq!(config.output_dir, PathBuf::from("reports"));
    assert_eq!(loaded.overrides.len(), 3);
}

#[tokio::test]
#[serial]
async fn json_config_files_are_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("excavator.json");
    fs::write(&path, r#"{"dom": {"hotSelectorFloor": 3}, "excavate": {"inspectStyles": true}}"#)
        .unwrap();

    let config = load_config(Some(&path)).await.unwrap().config;
    assert_eq!(config.dom.hot_selector_floor, 3);
    assert!(config.excavate.inspect_styles);
}

#[tokio::test]
#[serial]
async fn explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = load_config(Some(&dir.path().join("absent.yaml")))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[tokio::test]
#[serial]
async fn malformed_override_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("excavator.yaml");
    fs::write(&path, "").unwrap();
    let _guard = EnvGuard::set(&[("EXCAVATOR__LIVE__BATCH_LIMIT", "many")]);

    let err = load_config(Some(&path)).await.unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
