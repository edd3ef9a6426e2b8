use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use portier_core::config::Secret;

use crate::error::AppError;
use crate::state::AppState;

/// Whether the request's `Authorization` header carries the shared secret.
///
/// The whole header value must equal the secret byte for byte. A value of
/// `Bearer <secret>` is accepted too. An empty configured secret never matches.
pub fn is_authorized(headers: &HeaderMap, secret: &Secret) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Some(presented) = headers.get(AUTHORIZATION).map(|v| v.as_bytes()) else {
        return false;
    };
    let expected = secret.expose().as_bytes();
    presented == expected || presented.strip_prefix(b"Bearer ") == Some(expected)
}

/// Axum middleware guarding the timer API.
pub async fn require_auth(State(app): State<AppState>, req: Request, next: Next) -> Response {
    if is_authorized(req.headers(), &app.config.auth_key) {
        return next.run(req).await;
    }
    tracing::warn!(path = %req.uri().path(), "unauthorized request");
    AppError::unauthorized().into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn exact_value_is_accepted() {
        let secret = Secret::new("open-sesame");
        assert!(is_authorized(&headers_with("open-sesame"), &secret));
    }

    #[test]
    fn bearer_scheme_is_accepted() {
        let secret = Secret::new("open-sesame");
        assert!(is_authorized(&headers_with("Bearer open-sesame"), &secret));
    }

    #[test]
    fn secret_with_scheme_prefix_matches_whole_header() {
        let secret = Secret::new("Bearer abc123");
        assert!(is_authorized(&headers_with("Bearer abc123"), &secret));
        assert!(is_authorized(&headers_with("Bearer Bearer abc123"), &secret));
        assert!(!is_authorized(&headers_with("abc123"), &secret));
    }

    #[test]
    fn near_misses_are_rejected() {
        let secret = Secret::new("open-sesame");
        assert!(!is_authorized(&headers_with("open-sesame "), &secret));
        assert!(!is_authorized(&headers_with("Open-sesame"), &secret));
        assert!(!is_authorized(&headers_with("bearer open-sesame"), &secret));
        assert!(!is_authorized(&headers_with("open"), &secret));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(!is_authorized(&HeaderMap::new(), &Secret::new("x")));
    }

    #[test]
    fn empty_secret_never_matches() {
        assert!(!is_authorized(&headers_with(""), &Secret::default()));
    }
}
