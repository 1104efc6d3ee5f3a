//! Tests for configuration loading and graceful degradation
//!
//! Missing or broken config files must never stop startup; root folder
//! resolution follows CLI → ENV → TOML → compiled default.
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use wordtrack_common::config::{
    write_toml_config, CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
    ROOT_FOLDER_ENV,
};

fn resolver_without_config(temp_dir: &TempDir) -> RootFolderResolver {
    RootFolderResolver::new().with_config_file(temp_dir.path().join("absent.toml"))
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);
    let temp_dir = TempDir::new().unwrap();

    let root_folder = resolver_without_config(&temp_dir).resolve();

    assert!(!root_folder.as_os_str().is_empty());
    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/wordtrack-test-env-folder");
    let temp_dir = TempDir::new().unwrap();

    let root_folder = resolver_without_config(&temp_dir).resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/wordtrack-test-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/wordtrack-from-env");
    let temp_dir = TempDir::new().unwrap();

    let root_folder = resolver_without_config(&temp_dir)
        .with_cli_override(Some(PathBuf::from("/tmp/wordtrack-from-cli")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/wordtrack-from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_reads_toml_root_folder() {
    env::remove_var(ROOT_FOLDER_ENV);
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("wordtrack.toml");

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/wordtrack-from-toml")),
        ..Default::default()
    };
    write_toml_config(&config, &config_path).unwrap();

    let root_folder = RootFolderResolver::new()
        .with_config_file(config_path)
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/wordtrack-from-toml"));
}

#[test]
#[serial]
fn test_resolver_ignores_broken_toml() {
    env::remove_var(ROOT_FOLDER_ENV);
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("wordtrack.toml");
    std::fs::write(&config_path, "root_folder = [not toml").unwrap();

    let root_folder = RootFolderResolver::new()
        .with_config_file(config_path)
        .resolve();
    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
fn test_load_or_default_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = TomlConfig::load_or_default(&temp_dir.path().join("nope.toml"));
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_reports_parse_errors() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    std::fs::write(&path, "[dictionary\nbase_url = 1").unwrap();

    assert!(TomlConfig::load(&path).is_err());
    assert_eq!(TomlConfig::load_or_default(&path), TomlConfig::default());
}

#[test]
fn test_write_then_load_preserves_sections() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("wordtrack.toml");

    let mut config = TomlConfig::default();
    config.dictionary.base_url = "http://127.0.0.1:9999".to_string();
    config.pipeline.token_concurrency = 8;
    config.server.port = 6001;

    write_toml_config(&config, &path).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("toml.tmp").exists());

    let loaded = TomlConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_initializer_database_path() {
    let root = PathBuf::from("/tmp/wordtrack-test-root");
    let initializer = RootFolderInitializer::new(root.clone());
    assert_eq!(initializer.database_path(), root.join("wordtrack.db"));
}

#[test]
fn test_initializer_creates_nested_directory_idempotently() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("level1").join("level2");

    let initializer = RootFolderInitializer::new(root.clone());
    assert!(initializer.ensure_directory_exists().is_ok());
    assert!(initializer.ensure_directory_exists().is_ok());

    assert!(root.is_dir());
    assert!(!initializer.database_exists());
}
