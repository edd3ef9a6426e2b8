use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use portier_core::PortierError;

// ---------------------------------------------------------------------------
// Internal sentinels for statuses that have no PortierError variant
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

#[derive(Debug)]
struct UnauthorizedError;

impl std::fmt::Display for UnauthorizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unauthorized")
    }
}

impl std::error::Error for UnauthorizedError {}

#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
///
/// Client errors carry their message through. Anything that maps to a 500 is
/// logged in full and answered with a fixed short message.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub fn unauthorized() -> Self {
        Self(UnauthorizedError.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequestError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        if self.0.downcast_ref::<UnauthorizedError>().is_some() {
            return StatusCode::UNAUTHORIZED;
        }
        if self.0.downcast_ref::<NotFoundError>().is_some() {
            return StatusCode::NOT_FOUND;
        }

        match self.0.downcast_ref::<PortierError>() {
            Some(
                PortierError::UnknownTarget(_)
                | PortierError::InvalidDelay(_)
                | PortierError::DelayTooLong { .. }
                | PortierError::InvalidKey(_)
                | PortierError::TimerAlreadySet,
            ) => StatusCode::BAD_REQUEST,
            Some(PortierError::TimerNotFound(_)) => StatusCode::NOT_FOUND,
            Some(PortierError::SchedulerUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Some(
                PortierError::ConfigNotFound(_)
                | PortierError::InvalidConfig(_)
                | PortierError::TimerStore(_)
                | PortierError::Io(_)
                | PortierError::Yaml(_)
                | PortierError::Json(_),
            )
            | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
            match status {
                StatusCode::SERVICE_UNAVAILABLE => "scheduler unavailable".to_string(),
                _ => "internal error".to_string(),
            }
        } else {
            self.0.to_string()
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
