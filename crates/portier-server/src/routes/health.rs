use axum::{extract::State, Json};

use crate::state::AppState;

/// GET /api/health: liveness plus the number of armed timers, if readable.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    let pending = app.scheduler.pending().ok().map(|timers| timers.len());
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "pending_timers": pending,
    }))
}
