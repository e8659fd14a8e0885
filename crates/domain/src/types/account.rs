use serde::{Deserialize, Serialize};

/// Vendor account (company) the configured API key belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_id: String,
    pub name: String,
    /// Subscription plan, when the vendor reports one
    pub tier: Option<String>,
}
