//! Configuration loading and resolution
//!
//! Every setting resolves with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file in the default locations is not an error; an
//! explicitly named one that cannot be read is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

pub const ENV_CONFIG_FILE: &str = "FIADMIN_CONFIG";
pub const ENV_DATABASE: &str = "FIADMIN_DATABASE";
pub const ENV_BIND_ADDRESS: &str = "FIADMIN_BIND_ADDRESS";
pub const ENV_SEARCH_SERVICE_URL: &str = "FIADMIN_SEARCH_SERVICE_URL";
pub const ENV_SITE_BASE_URL: &str = "FIADMIN_SITE_BASE_URL";
pub const ENV_VERSION_FILE: &str = "FIADMIN_VERSION_FILE";
pub const ENV_SEARCH_TIMEOUT_SECS: &str = "FIADMIN_SEARCH_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "FIADMIN_LOG_LEVEL";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_SEARCH_SERVICE_URL: &str = "http://localhost:8080/";
pub const DEFAULT_SITE_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_VERSION_FILE: &str = "version.txt";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of the TOML config file (`fiadmin.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub search_service_url: Option<String>,
    pub site_base_url: Option<String>,
    pub version_file: Option<PathBuf>,
    pub search_timeout_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Field name → ISIS tag overrides, merged over the LILACS defaults
    #[serde(default)]
    pub field_tags: HashMap<String, u32>,
}

/// Logging section of the TOML config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing level when RUST_LOG is not set
    pub level: Option<String>,
}

/// Tier 1 values, usually filled from command-line arguments.
/// `None` falls through to the next tier.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub search_service_url: Option<String>,
    pub site_base_url: Option<String>,
    pub version_file: Option<PathBuf>,
    pub search_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
///
/// Passed explicitly into the record assembler and the search client; nothing
/// reads settings from process-wide state after startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub bind_address: String,
    /// Base URL of the search service, always ending in `/`
    pub search_service_url: String,
    /// Public site URL used for attachment links, never ending in `/`
    pub site_base_url: String,
    /// Text file holding the version marker, re-read on every request
    pub version_file: PathBuf,
    /// Timeout for search passthrough calls; `None` waits indefinitely
    pub search_timeout_secs: Option<u64>,
    pub log_level: String,
    pub field_tags: HashMap<String, u32>,
    /// TOML file the settings were read from, if any
    pub config_file: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve configuration from all four tiers
    ///
    /// Runs before logging is set up, so nothing is logged here; the caller
    /// reports [`ServiceConfig::config_file`] once tracing is installed.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let config_file = config_file_path(overrides.config_file.as_deref());
        let toml_config = match &config_file {
            Some(path) => load_toml_config(path)?,
            None => TomlConfig::default(),
        };

        let mut config = Self::from_sources(overrides, toml_config)?;
        config.config_file = config_file;
        Ok(config)
    }

    /// Resolve configuration from tier 1 values, the environment and an
    /// already-loaded TOML config
    pub fn from_sources(overrides: ConfigOverrides, toml_config: TomlConfig) -> Result<Self> {
        let database_path = overrides
            .database_path
            .or_else(|| env_var(ENV_DATABASE).map(PathBuf::from))
            .or(toml_config.database_path)
            .unwrap_or_else(default_database_path);

        let bind_address = overrides
            .bind_address
            .or_else(|| env_var(ENV_BIND_ADDRESS))
            .or(toml_config.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let search_service_url = overrides
            .search_service_url
            .or_else(|| env_var(ENV_SEARCH_SERVICE_URL))
            .or(toml_config.search_service_url)
            .unwrap_or_else(|| DEFAULT_SEARCH_SERVICE_URL.to_string());

        let site_base_url = overrides
            .site_base_url
            .or_else(|| env_var(ENV_SITE_BASE_URL))
            .or(toml_config.site_base_url)
            .unwrap_or_else(|| DEFAULT_SITE_BASE_URL.to_string());

        let version_file = overrides
            .version_file
            .or_else(|| env_var(ENV_VERSION_FILE).map(PathBuf::from))
            .or(toml_config.version_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VERSION_FILE));

        let search_timeout_secs = match overrides.search_timeout_secs {
            Some(secs) => Some(secs),
            None => match env_var(ENV_SEARCH_TIMEOUT_SECS) {
                Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                    Error::Config(format!(
                        "{} must be a whole number of seconds, got '{}'",
                        ENV_SEARCH_TIMEOUT_SECS, raw
                    ))
                })?),
                None => toml_config.search_timeout_secs,
            },
        };

        let log_level = overrides
            .log_level
            .or_else(|| env_var(ENV_LOG_LEVEL))
            .or(toml_config.logging.level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            database_path,
            bind_address,
            search_service_url: normalize_search_service_url(&search_service_url)?,
            site_base_url: normalize_site_base_url(&site_base_url)?,
            version_file,
            search_timeout_secs,
            log_level,
            field_tags: toml_config.field_tags,
            config_file: None,
        })
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Locate the config file
///
/// An explicit path (argument or FIADMIN_CONFIG) is returned even when it does
/// not exist so that loading reports it. Default locations are only returned
/// when present: `~/.config/fiadmin/fiadmin.toml`, then `/etc/fiadmin/fiadmin.toml`.
pub fn config_file_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env_var(ENV_CONFIG_FILE) {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join("fiadmin").join("fiadmin.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/fiadmin/fiadmin.toml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fiadmin").join("fiadmin.db"))
        .unwrap_or_else(|| PathBuf::from("./fiadmin_data/fiadmin.db"))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_http_url(raw: &str, setting: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", setting, raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "Invalid {} '{}': unsupported scheme '{}'",
            setting, raw, other
        ))),
    }
}

/// Search endpoints are built by appending to this URL, so it keeps a trailing `/`
pub fn normalize_search_service_url(raw: &str) -> Result<String> {
    let mut url = parse_http_url(raw, "search service URL")?.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    Ok(url)
}

pub fn normalize_site_base_url(raw: &str) -> Result<String> {
    let url = parse_http_url(raw, "site base URL")?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}
