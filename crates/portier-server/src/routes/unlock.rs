use axum::{
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use portier_core::types::parse_delay;
use portier_core::{ActionResult, ArmOutcome, DoorSelection, ScheduleKey, Target};
use serde::Deserialize;

use crate::auth::is_authorized;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UnlockQuery {
    pub door: Option<String>,
    pub timeout: Option<String>,
}

/// GET /{path}?door=street|floor|both&timeout=SECS: unlock one door, or the
/// street door now and the floor door after a delay.
///
/// The request path names the schedule key, so `/` and `/office` keep
/// separate delayed timers. Checks run in order: method (400), credential
/// (401), query (400); nothing is unlocked until all three pass.
pub async fn unlock(
    State(app): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if method != Method::GET {
        return Err(AppError::bad_request("bad request"));
    }
    if !is_authorized(&headers, &app.config.auth_key) {
        tracing::warn!(path = %uri.path(), "unauthorized unlock request");
        return Err(AppError::unauthorized());
    }
    if is_api_path(uri.path()) {
        return Err(AppError::not_found(format!("no route for {}", uri.path())));
    }

    let Query(query) = Query::<UnlockQuery>::try_from_uri(&uri)
        .map_err(|_| AppError::bad_request("bad request"))?;

    match DoorSelection::parse(query.door.as_deref())? {
        DoorSelection::Single(target) => {
            let result = app.invoker.invoke(target).await;
            Ok(immediate_response(result))
        }
        DoorSelection::Both => {
            let delay = parse_delay(query.timeout.as_deref())?;
            let delay = app.config.delay.effective(delay)?;
            let key = ScheduleKey::from_path(uri.path())?;
            unlock_both(&app, &key, delay).await
        }
    }
}

async fn unlock_both(app: &AppState, key: &ScheduleKey, delay_secs: u64) -> Result<Response, AppError> {
    let immediate = app.invoker.invoke(Target::Street).await;
    if !immediate.success && !app.config.scheduler.arm_after_failure {
        return Ok(immediate_response(immediate));
    }

    let status_ok = if immediate.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    match app.scheduler.arm(key, Some(delay_secs)).await? {
        ArmOutcome::Accepted {
            delay_secs,
            fire_at_ms,
        } => {
            let mut body = serde_json::json!({
                "immediate": immediate,
                "scheduled": {
                    "door": Target::Floor,
                    "key": key,
                    "delay_secs": delay_secs,
                    "fire_at_ms": fire_at_ms,
                },
            });
            if !immediate.success {
                body["error"] = serde_json::json!("unlock failed");
            }
            Ok((status_ok, Json(body)).into_response())
        }
        ArmOutcome::Rejected { fire_at_ms } => {
            // A failed remote unlock outranks the rejected arm.
            let (status, error) = if immediate.success {
                (StatusCode::BAD_REQUEST, "timer already set")
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, "unlock failed")
            };
            let body = serde_json::json!({
                "error": error,
                "immediate": immediate,
                "pending": { "key": key, "fire_at_ms": fire_at_ms },
            });
            Ok((status, Json(body)).into_response())
        }
    }
}

/// `/api` and everything below it belong to the JSON API, never to a lock.
fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

fn immediate_response(result: ActionResult) -> Response {
    if result.success {
        (StatusCode::OK, Json(serde_json::json!({ "immediate": result }))).into_response()
    } else {
        let body = serde_json::json!({ "error": "unlock failed", "immediate": result });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_prefix_is_reserved() {
        assert!(is_api_path("/api"));
        assert!(is_api_path("/api/"));
        assert!(is_api_path("/api/nope"));
        assert!(!is_api_path("/apiary"));
        assert!(!is_api_path("/"));
    }
}
