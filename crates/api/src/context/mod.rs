//! Application context - dependency injection container
//!
//! Holds the shared, immutable state every request handler sees: the HR
//! directory port and the inbound credential, if one is configured.

use std::sync::Arc;

use hrlink_core::HrDirectory;
use hrlink_domain::{ApiKey, Config, Result, ServerConfig};
use hrlink_infra::SesameClient;
use tokio_util::sync::CancellationToken;

/// Type alias for the directory port trait object
type DynHrDirectory = dyn HrDirectory + Send + Sync + 'static;

#[derive(Clone)]
pub struct AppContext {
    pub directory: Arc<DynHrDirectory>,
    /// Key inbound callers must present on `/api/v1/*`; `None` leaves the
    /// surface open
    pub api_key: Option<ApiKey>,
}

impl AppContext {
    pub fn new(directory: Arc<DynHrDirectory>, server: &ServerConfig) -> Self {
        Self { directory, api_key: server.api_key.clone() }
    }

    /// Wire the Sesame-backed directory from a loaded configuration.
    ///
    /// Cancelling `cancel` aborts any vendor call or backoff wait in flight.
    ///
    /// # Errors
    /// Returns `HrLinkError::Config` when the configuration is unusable.
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self> {
        let client = SesameClient::from_config(config, cancel)?;
        Ok(Self::new(Arc::new(client), &config.server))
    }

    pub fn requires_auth(&self) -> bool {
        self.api_key.is_some()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}
