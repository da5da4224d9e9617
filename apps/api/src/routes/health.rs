use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness check reporting the service name and crate version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "secondbrain-api"
    }))
}
