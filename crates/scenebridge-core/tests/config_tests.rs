use scenebridge_core::{BridgeConfig, CoreError};
use std::fs;

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "sAcnUniverse": 7,
            "channel": 5,
            "scenes": ["baseocean", "orangehigh", "strobe"],
            "ledfx_host": "http://192.168.1.20:8888"
        }"#,
    )
    .unwrap();

    let config = BridgeConfig::load(&path).unwrap();
    assert_eq!(config.universe, 7);
    assert_eq!(config.channel_index(), 4);
    assert_eq!(config.scenes.len(), 3);
    assert_eq!(config.controller_base_url(), "http://192.168.1.20:8888");
}

#[test]
fn test_load_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BridgeConfig::load(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, CoreError::ConfigRead { .. }));
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = BridgeConfig::load_or_default(dir.path().join("missing.json")).unwrap();
    assert_eq!(config, BridgeConfig::default());
}

#[test]
fn test_load_or_default_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let err = BridgeConfig::load_or_default(&path).unwrap_err();
    assert!(matches!(err, CoreError::JsonError(_)));
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"channel": 600}"#).unwrap();

    let err = BridgeConfig::load_or_default(&path).unwrap_err();
    assert!(matches!(err, CoreError::InvalidConfig(_)));
}

#[test]
fn test_log_section() {
    let config = BridgeConfig::from_json(
        r#"{"log": {"level": "debug", "file_output": true, "max_files": 2}}"#,
    )
    .unwrap();
    assert_eq!(config.log.level, "debug");
    assert!(config.log.file_output);
    assert_eq!(config.log.max_files, 2);
    // Unspecified fields keep their defaults
    assert!(config.log.console_output);
}

#[test]
fn test_example_config_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config.example.json");
    let config = BridgeConfig::load(&path).unwrap();
    assert_eq!(config.universe, 1);
    assert_eq!(config.scenes.len(), 3);
    assert_eq!(config.controller_base_url(), "http://127.0.0.1:8888");
    assert!(!config.log.file_output);
}
