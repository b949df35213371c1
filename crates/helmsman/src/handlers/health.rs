//! Service endpoints.
//!
//! - `/health` - Liveness with the serving host's name
//! - `/ping` - Empty success envelope
//! - `/codes` - The application error-code table

use axum::Json;
use serde_json::{json, Value};

use helmsman_core::ecode::{all_codes, ErrorCode, Reply};

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "UP",
        "hostname": hostname(),
    }))
}

/// GET /ping
pub async fn ping() -> Json<Reply<Value>> {
    Json(Reply::success(json!({})))
}

/// GET /codes
pub async fn codes() -> Json<Reply<Vec<ErrorCode>>> {
    Json(Reply::success(all_codes()))
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
