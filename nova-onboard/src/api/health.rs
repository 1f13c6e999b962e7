//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "nova-onboard",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.registrar.store_name(),
    }))
}
