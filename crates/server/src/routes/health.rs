//! Liveness endpoint, mounted per `config::HealthConfig`.

use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
