//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If the required vendor variables are set, configuration comes from the
//!    environment only
//! 2. Otherwise falls back to loading from a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `HRLINK_VENDOR_BASE_URL`: Sesame API base URL (required)
//! - `HRLINK_VENDOR_API_KEY`: Sesame API key (required)
//! - `HRLINK_VENDOR_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `HRLINK_RETRY_MAX_ATTEMPTS`: Total attempts per vendor call
//! - `HRLINK_RETRY_BASE_DELAY_MS`: First backoff delay in milliseconds
//! - `HRLINK_RETRY_MAX_DELAY_MS`: Backoff delay cap in milliseconds
//! - `HRLINK_PAGINATION_MAX_PAGES`: Page limit per call
//! - `HRLINK_SERVER_HOST` / `HRLINK_SERVER_PORT`: Bind address
//! - `HRLINK_SERVER_API_KEY`: Inbound API key; unset disables inbound auth
//! - `HRLINK_LOG_FORMAT`: `pretty` or `json`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./hrlink.toml`, `./hrlink.json`, `./config.toml`, `./config.json`
//! 2. The same names in the parent directory
//! 3. Relative to executable location

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hrlink_domain::{
    ApiKey, Config, HrLinkError, LogFormat, LoggingConfig, PaginationConfig, Result, RetryConfig,
    ServerConfig, VendorConfig,
};

const BASE_URL_VAR: &str = "HRLINK_VENDOR_BASE_URL";
const API_KEY_VAR: &str = "HRLINK_VENDOR_API_KEY";

const CONFIG_FILE_NAMES: &[&str] = &["hrlink.toml", "hrlink.json", "config.toml", "config.json"];

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Environment,
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => f.write_str("environment"),
            Self::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

/// Load configuration with automatic fallback strategy
///
/// Uses the environment when the required vendor variables are present,
/// and a config file otherwise.
///
/// # Errors
/// Returns `HrLinkError::Config` if:
/// - Neither source provides the required values
/// - A value cannot be parsed
/// - File format is invalid
/// - The resulting configuration fails validation
pub fn load() -> Result<Config> {
    load_with_source().map(|(config, _)| config)
}

/// Same as [`load`], also reporting which source was used.
///
/// Nothing is logged here: this runs before the subscriber is installed, so
/// callers log the returned [`ConfigSource`] once logging is up.
///
/// # Errors
/// See [`load`].
pub fn load_with_source() -> Result<(Config, ConfigSource)> {
    let env_present = [BASE_URL_VAR, API_KEY_VAR].iter().any(|key| std::env::var(key).is_ok());

    if env_present {
        return Ok((load_from_env()?, ConfigSource::Environment));
    }

    let not_configured = |detail: String| {
        HrLinkError::Config(format!(
            "{BASE_URL_VAR} and {API_KEY_VAR} are not set and no usable config file was found: {detail}"
        ))
    };

    let path = probe_config_paths()
        .ok_or_else(|| not_configured("no config file in any of the standard locations".into()))?;
    let config = load_from_file(Some(path.clone())).map_err(|e| not_configured(e.to_string()))?;
    Ok((config, ConfigSource::File(path)))
}

/// Load configuration from environment variables
///
/// The vendor base URL and API key must be present; every other value
/// falls back to its default.
///
/// # Errors
/// Returns `HrLinkError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let retry_defaults = RetryConfig::default();
    let pagination_defaults = PaginationConfig::default();
    let server_defaults = ServerConfig::default();

    let config = Config {
        vendor: VendorConfig {
            base_url: env_var(BASE_URL_VAR)?,
            api_key: ApiKey::new(env_var(API_KEY_VAR)?),
            timeout_secs: env_parse("HRLINK_VENDOR_TIMEOUT_SECS", 30)?,
        },
        retry: RetryConfig {
            max_attempts: env_parse("HRLINK_RETRY_MAX_ATTEMPTS", retry_defaults.max_attempts)?,
            base_delay_ms: env_parse("HRLINK_RETRY_BASE_DELAY_MS", retry_defaults.base_delay_ms)?,
            max_delay_ms: env_parse("HRLINK_RETRY_MAX_DELAY_MS", retry_defaults.max_delay_ms)?,
        },
        pagination: PaginationConfig {
            max_pages: env_parse("HRLINK_PAGINATION_MAX_PAGES", pagination_defaults.max_pages)?,
        },
        server: ServerConfig {
            host: std::env::var("HRLINK_SERVER_HOST").unwrap_or(server_defaults.host),
            port: env_parse("HRLINK_SERVER_PORT", server_defaults.port)?,
            api_key: std::env::var("HRLINK_SERVER_API_KEY").ok().map(ApiKey::new),
        },
        logging: LoggingConfig {
            format: env_parse("HRLINK_LOG_FORMAT", LogFormat::default())?,
        },
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `HrLinkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(HrLinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            HrLinkError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| HrLinkError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| HrLinkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| HrLinkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(HrLinkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
            dirs.push(exe_dir.join(".."));
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `HrLinkError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(HrLinkError::Config(format!("Missing required environment variable: {key}"))),
    }
}

/// Parse an optional environment variable, using `default` when unset.
///
/// # Errors
/// Returns `HrLinkError::Config` if the variable is set but unparsable.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| HrLinkError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
