use axum::{
    extract::{Query, State},
    Json,
};
use portier_core::types::parse_delay;
use portier_core::{ArmOutcome, PendingTimer, PortierError, ScheduleKey};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TimerQuery {
    pub key: Option<String>,
    pub timeout: Option<String>,
}

impl TimerQuery {
    fn schedule_key(&self) -> Result<ScheduleKey, AppError> {
        match self.key.as_deref() {
            None => Ok(ScheduleKey::root()),
            Some(raw) => Ok(ScheduleKey::from_path(raw)?),
        }
    }
}

fn timer_json(timer: &PendingTimer) -> serde_json::Value {
    serde_json::json!({
        "key": timer.key,
        "door": timer.target,
        "fire_at_ms": timer.fire_at_ms,
        "armed_at": timer.armed_at,
    })
}

/// GET /api/timers: all pending timers, earliest first.
pub async fn list_timers(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let timers = app.scheduler.pending()?;
    let list: Vec<serde_json::Value> = timers.iter().map(timer_json).collect();
    Ok(Json(serde_json::json!(list)))
}

/// GET /api/timer?key=K: the pending timer for one key.
pub async fn get_timer(
    State(app): State<AppState>,
    Query(query): Query<TimerQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = query.schedule_key()?;
    let timer = app
        .scheduler
        .status(&key)?
        .ok_or_else(|| PortierError::TimerNotFound(key.to_string()))?;
    Ok(Json(timer_json(&timer)))
}

/// POST /api/timer?key=K&timeout=SECS: arm the delayed unlock directly.
///
/// 400 `timer already set` when the key is armed, otherwise the delay that
/// was actually used.
pub async fn arm_timer(
    State(app): State<AppState>,
    Query(query): Query<TimerQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = query.schedule_key()?;
    let delay = parse_delay(query.timeout.as_deref())?;
    match app.scheduler.arm(&key, delay).await? {
        ArmOutcome::Accepted {
            delay_secs,
            fire_at_ms,
        } => Ok(Json(serde_json::json!({
            "key": key,
            "delay_secs": delay_secs,
            "fire_at_ms": fire_at_ms,
        }))),
        ArmOutcome::Rejected { .. } => Err(PortierError::TimerAlreadySet.into()),
    }
}

/// DELETE /api/timer?key=K: cancel; succeeds even when nothing was armed.
pub async fn cancel_timer(
    State(app): State<AppState>,
    Query(query): Query<TimerQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = query.schedule_key()?;
    let cancelled = app.scheduler.cancel(&key).await?;
    Ok(Json(serde_json::json!({ "key": key, "cancelled": cancelled })))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
