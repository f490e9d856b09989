#![cfg(test)]

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use crate::config::{AppConfig, ConfigData, ConfigError, ConfigFormat};
use crate::kernel::constants;

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("a.json")), Some(ConfigFormat::Json));
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")), Some(ConfigFormat::Toml));
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), Some(ConfigFormat::Yaml));
    assert_eq!(ConfigFormat::from_path(Path::new("a.ini")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("noext")), None);
}

#[test]
fn test_config_data_get_set_merge() {
    let mut data = ConfigData::new();
    data.set("level", "info").unwrap();
    data.set("retries", 3u32).unwrap();

    assert_eq!(data.get::<String>("level").as_deref(), Some("info"));
    assert_eq!(data.get::<u32>("retries"), Some(3));
    assert_eq!(data.get::<u32>("level"), None, "wrong shape yields None");
    assert_eq!(data.get_or("missing", 10u32), 10);

    let mut other = ConfigData::new();
    other.set("level", "debug").unwrap();
    data.merge(&other);
    assert_eq!(data.get::<String>("level").as_deref(), Some("debug"));
    assert_eq!(data.keys(), vec!["level".to_string(), "retries".to_string()]);

    assert!(data.remove("retries").is_some());
    assert!(!data.contains_key("retries"));
}

#[test]
fn test_default_app_config() {
    let config = AppConfig::default();
    assert_eq!(config.app_name, constants::APP_NAME);
    assert!(config.plugin_config("anything").is_empty());
}

#[test]
fn test_load_json_config() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("stratum.json");
    fs::write(
        &path,
        r#"{ "app_name": "demo", "plugins": { "core-logging": { "level": "warn" } } }"#,
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.app_name, "demo");
    assert_eq!(
        config.plugin_config("core-logging").get::<String>("level").as_deref(),
        Some("warn")
    );
}

#[cfg(feature = "toml-config")]
#[test]
fn test_load_toml_config_with_missing_fields() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("stratum.toml");
    fs::write(&path, "[plugins.orders]\nseed = 2\n").unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.app_name, constants::APP_NAME, "missing app_name falls back to default");
    assert_eq!(config.plugin_config("orders").get::<i64>("seed"), Some(2));
}

#[test]
fn test_save_then_load_json() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("out.json");

    let mut config = AppConfig::default();
    let mut section = ConfigData::new();
    section.set("format", "json").unwrap();
    config.set_plugin_config("core-logging", section);
    config.save(&path).unwrap();

    assert_eq!(AppConfig::load(&path).unwrap(), config);
}

#[test]
fn test_load_errors() {
    let dir = tempdir().expect("Failed to create temporary directory");

    let unsupported = dir.path().join("config.ini");
    assert!(matches!(AppConfig::load(&unsupported), Err(ConfigError::UnsupportedFormat(_))));

    let missing = dir.path().join("absent.json");
    assert!(matches!(AppConfig::load(&missing), Err(ConfigError::Io { .. })));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(AppConfig::load(&broken), Err(ConfigError::Deserialization { .. })));
}
