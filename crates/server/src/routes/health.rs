use std::sync::Arc;

use axum::{Extension, Json};
use serde_json::Value as JsonValue;

use crate::store::GameStore;

/// GET /health
pub async fn health_check(Extension(store): Extension<Arc<GameStore>>) -> Json<JsonValue> {
    Json(serde_json::json!({
        "status": "ok",
        "libraries": store.len(),
    }))
}
