//! Integration tests for configuration resolution
//!
//! Tests that manipulate PSCAN_CONFIG are marked with #[serial] so they run
//! sequentially, not in parallel.

use pscan_common::config::{
    locate_config_file, ConfigOverrides, ConfigSource, ServiceConfig, CONFIG_ENV_VAR,
};
use pscan_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("pscan-ca.toml");
    std::fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = ServiceConfig::from_toml_str(
        r#"
        [server]
        port = 9100

        [decoder]
        require_ffmpeg = false
        "#,
    )
    .unwrap();

    assert_eq!(config.server.port, 9100);
    assert_eq!(config.server.host, "0.0.0.0");
    assert!(!config.decoder.require_ffmpeg);
    assert!(config.decoder.ffmpeg_enabled);
    assert_eq!(config.decoder.decode_timeout_secs, 30);
    assert_eq!(config.cors.allowed_origins.len(), 2);
}

#[test]
fn test_malformed_toml_is_config_error() {
    let result = ServiceConfig::from_toml_str("[server\nport = ");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_path_beats_environment() {
    let dir = tempfile::tempdir().unwrap();
    let cli_path = write_config(&dir, "[server]\nport = 9200\n");
    env::set_var(CONFIG_ENV_VAR, "/nonexistent/from-env.toml");

    let located = locate_config_file(Some(&cli_path));
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(located, Some(cli_path));
}

#[test]
#[serial]
fn test_environment_path_used_without_cli() {
    let dir = tempfile::tempdir().unwrap();
    let env_path = write_config(&dir, "[server]\nport = 9300\n");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let config = ServiceConfig::resolve(&ConfigOverrides::default());
    env::remove_var(CONFIG_ENV_VAR);

    let (config, source) = config.unwrap();
    assert_eq!(config.server.port, 9300);
    assert_eq!(source, ConfigSource::File(env_path));
}

#[test]
#[serial]
fn test_overrides_beat_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
        [server]
        host = "127.0.0.1"
        port = 9400

        [cors]
        allowed_origins = ["http://file.test"]
        "#,
    );

    let overrides = ConfigOverrides {
        config_path: Some(path),
        port: Some(9500),
        allowed_origins: Some(vec!["https://cli.test".to_string()]),
        ..Default::default()
    };
    let (config, _) = ServiceConfig::resolve(&overrides).unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9500);
    assert_eq!(config.cors.allowed_origins, vec!["https://cli.test"]);
    assert_eq!(config.bind_address(), "127.0.0.1:9500");
}

#[test]
#[serial]
fn test_missing_explicit_file_is_fatal() {
    env::remove_var(CONFIG_ENV_VAR);
    let overrides = ConfigOverrides {
        config_path: Some(PathBuf::from("/nonexistent/pscan-ca.toml")),
        ..Default::default()
    };

    let err = ServiceConfig::resolve(&overrides).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/pscan-ca.toml"));
}

#[test]
fn test_invalid_origin_rejected_on_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[cors]\nallowed_origins = [\"ftp://nope\"]\n");

    let overrides = ConfigOverrides {
        config_path: Some(path),
        ..Default::default()
    };
    assert!(matches!(
        ServiceConfig::resolve(&overrides),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_scratch_dir_must_exist() {
    let mut config = ServiceConfig::default();
    config.decoder.scratch_dir = Some(PathBuf::from("/nonexistent/pscan-scratch"));
    assert!(matches!(config.validate(), Err(Error::Io(_))));

    let dir = tempfile::tempdir().unwrap();
    config.decoder.scratch_dir = Some(dir.path().to_path_buf());
    assert!(config.validate().is_ok());
}
