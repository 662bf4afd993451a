//! Configuration resolution tests
//!
//! Tests that touch FIADMIN_* variables are marked #[serial] so they never
//! race each other.

use fiadmin_common::config::{
    config_file_path, load_toml_config, ConfigOverrides, ServiceConfig, TomlConfig,
    DEFAULT_BIND_ADDRESS, DEFAULT_SEARCH_SERVICE_URL, ENV_BIND_ADDRESS, ENV_CONFIG_FILE,
    ENV_DATABASE, ENV_SEARCH_SERVICE_URL, ENV_SEARCH_TIMEOUT_SECS, ENV_SITE_BASE_URL,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

fn clear_env() {
    for name in [
        ENV_CONFIG_FILE,
        ENV_DATABASE,
        ENV_BIND_ADDRESS,
        ENV_SEARCH_SERVICE_URL,
        ENV_SITE_BASE_URL,
        ENV_SEARCH_TIMEOUT_SECS,
    ] {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let config = ServiceConfig::from_sources(ConfigOverrides::default(), TomlConfig::default())
        .expect("defaults should resolve");

    assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    assert_eq!(config.search_service_url, DEFAULT_SEARCH_SERVICE_URL);
    assert_eq!(config.site_base_url, "http://localhost:8000");
    assert_eq!(config.search_timeout_secs, None);
    assert_eq!(config.log_level, "info");
    assert!(config.field_tags.is_empty());
    assert_eq!(config.config_file, None);
}

#[test]
#[serial]
fn test_priority_cli_over_env_over_toml() {
    clear_env();
    env::set_var(ENV_BIND_ADDRESS, "0.0.0.0:9000");
    env::set_var(ENV_SEARCH_SERVICE_URL, "http://env-search.example.org");

    let toml_config = TomlConfig {
        bind_address: Some("10.0.0.1:7000".to_string()),
        search_service_url: Some("http://toml-search.example.org/".to_string()),
        site_base_url: Some("https://toml-site.example.org/".to_string()),
        database_path: Some(PathBuf::from("/var/lib/fiadmin/toml.db")),
        ..Default::default()
    };
    let overrides = ConfigOverrides {
        bind_address: Some("127.0.0.1:1234".to_string()),
        ..Default::default()
    };

    let config = ServiceConfig::from_sources(overrides, toml_config).unwrap();

    // CLI beats env
    assert_eq!(config.bind_address, "127.0.0.1:1234");
    // env beats TOML
    assert_eq!(config.search_service_url, "http://env-search.example.org/");
    // TOML beats default
    assert_eq!(config.site_base_url, "https://toml-site.example.org");
    assert_eq!(config.database_path, PathBuf::from("/var/lib/fiadmin/toml.db"));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_timeout_env_is_config_error() {
    clear_env();
    env::set_var(ENV_SEARCH_TIMEOUT_SECS, "soon");

    let result = ServiceConfig::from_sources(ConfigOverrides::default(), TomlConfig::default());
    assert!(result.is_err());

    env::set_var(ENV_SEARCH_TIMEOUT_SECS, " 15 ");
    let config =
        ServiceConfig::from_sources(ConfigOverrides::default(), TomlConfig::default()).unwrap();
    assert_eq!(config.search_timeout_secs, Some(15));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_url_rejected_at_load() {
    clear_env();
    let overrides = ConfigOverrides {
        site_base_url: Some("file:///srv/site".to_string()),
        ..Default::default()
    };

    let result = ServiceConfig::from_sources(overrides, TomlConfig::default());
    assert!(result.is_err());
}

#[test]
fn test_load_toml_config_with_field_tags() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
database_path = "/data/fiadmin.db"
search_service_url = "http://iahx.example.org/"
search_timeout_secs = 30

[logging]
level = "debug"

[field_tags]
alternate_ids = 899
doi = 0
"#
    )
    .unwrap();

    let config = load_toml_config(file.path()).expect("valid TOML");
    assert_eq!(config.database_path, Some(PathBuf::from("/data/fiadmin.db")));
    assert_eq!(config.search_timeout_secs, Some(30));
    assert_eq!(config.logging.level.as_deref(), Some("debug"));
    assert_eq!(config.field_tags.get("alternate_ids"), Some(&899));
    assert_eq!(config.field_tags.get("doi"), Some(&0));
}

#[test]
fn test_load_toml_config_reports_parse_errors() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "search_timeout_secs = \"thirty\"").unwrap();

    let err = load_toml_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Parse"));
}

#[test]
fn test_load_toml_config_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_toml_config(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Read"));
}

#[test]
#[serial]
fn test_config_file_path_priority() {
    clear_env();
    let explicit = PathBuf::from("/tmp/explicit-fiadmin.toml");
    assert_eq!(config_file_path(Some(&explicit)), Some(explicit.clone()));

    env::set_var(ENV_CONFIG_FILE, "/tmp/env-fiadmin.toml");
    assert_eq!(
        config_file_path(None),
        Some(PathBuf::from("/tmp/env-fiadmin.toml"))
    );
    assert_eq!(config_file_path(Some(&explicit)), Some(explicit));

    clear_env();
}

#[test]
#[serial]
fn test_resolve_reads_explicit_config_file() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "bind_address = \"0.0.0.0:8123\"").unwrap();

    let config = ServiceConfig::resolve(ConfigOverrides {
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(config.bind_address, "0.0.0.0:8123");
    assert_eq!(config.config_file.as_deref(), Some(file.path()));
}
