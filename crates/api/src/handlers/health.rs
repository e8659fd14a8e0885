//! Liveness probe

use axum::Json;
use serde_json::{json, Value};

/// Always answers `{"status":"ok"}`; never touches the vendor.
pub async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
