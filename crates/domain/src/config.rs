//! Configuration management

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{HrLinkError, Result};

/// Application configuration
///
/// Only `vendor.base_url` and `vendor.api_key` are required; every other
/// section falls back to its defaults when omitted from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub vendor: VendorConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Secret credential that never shows up in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key, for building or checking an `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Vendor (Sesame) endpoint and credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: ApiKey,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per vendor call, including the first one
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay_ms: 200, max_delay_ms: 5_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Upper bound on vendor pages fetched by a single call
    pub max_pages: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { max_pages: 100 }
    }
}

/// Bind address and inbound authentication for the exposure layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing)]
    pub api_key: Option<ApiKey>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080, api_key: None }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = HrLinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(HrLinkError::Config(format!("Unsupported log format: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

fn default_timeout_secs() -> u64 {
    30
}

impl VendorConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: ApiKey::new(api_key),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Configuration with defaults for everything except the vendor endpoint.
    pub fn with_vendor(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            vendor: VendorConfig::new(base_url, api_key),
            retry: RetryConfig::default(),
            pagination: PaginationConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Check the invariants the rest of the system relies on.
    ///
    /// # Errors
    /// Returns `HrLinkError::Config` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.vendor.base_url.trim();
        if base_url.is_empty() {
            return Err(HrLinkError::Config("vendor.base_url must not be empty".into()));
        }
        let parsed = url::Url::parse(base_url)
            .map_err(|e| HrLinkError::Config(format!("vendor.base_url is not a valid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HrLinkError::Config(format!(
                "vendor.base_url must use http or https, got {}",
                parsed.scheme()
            )));
        }
        if self.vendor.api_key.is_empty() {
            return Err(HrLinkError::Config("vendor.api_key must not be empty".into()));
        }
        if self.vendor.timeout_secs == 0 {
            return Err(HrLinkError::Config("vendor.timeout_secs must be positive".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(HrLinkError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(HrLinkError::Config(
                "retry.base_delay_ms must not exceed retry.max_delay_ms".into(),
            ));
        }
        if self.pagination.max_pages == 0 {
            return Err(HrLinkError::Config("pagination.max_pages must be at least 1".into()));
        }
        if matches!(&self.server.api_key, Some(key) if key.is_empty()) {
            return Err(HrLinkError::Config("server.api_key must not be empty when set".into()));
        }
        Ok(())
    }
}
