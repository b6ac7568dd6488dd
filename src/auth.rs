//! Shared-secret authentication middleware.
//!
//! Header `x-api-key`. `/admin/*` and `/export/*` are checked against the
//! admin key; mutating methods everywhere else against the API key. A key
//! that is not configured disables its check.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::app::AppState;
use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Which secret, if any, a request must present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard {
    Admin,
    Write,
    Open,
}

fn guard_for(method: &Method, path: &str) -> Guard {
    if path_has_prefix(path, "/admin") || path_has_prefix(path, "/export") {
        return Guard::Admin;
    }
    match *method {
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE => Guard::Write,
        _ => Guard::Open,
    }
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

fn key_matches(expected: &SecretString, provided: Option<&str>) -> bool {
    provided.is_some_and(|p| !p.is_empty() && p == expected.expose_secret())
}

pub(crate) async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let guard = guard_for(request.method(), request.uri().path());
    let (expected, label) = match guard {
        Guard::Admin => (state.config.admin_api_key.as_ref(), "admin API key"),
        Guard::Write => (state.config.api_key.as_ref(), "API key"),
        Guard::Open => (None, ""),
    };
    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if key_matches(expected, provided) {
        return next.run(request).await;
    }

    warn!(
        method = %request.method(),
        path = request.uri().path(),
        "Rejected request with missing or invalid {label}"
    );
    ApiError::Unauthorized(format!("Invalid or missing {label}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_export_paths_use_admin_guard() {
        assert_eq!(guard_for(&Method::GET, "/admin/info"), Guard::Admin);
        assert_eq!(guard_for(&Method::GET, "/export/all"), Guard::Admin);
        assert_eq!(guard_for(&Method::GET, "/administrator"), Guard::Open);
    }

    #[test]
    fn mutating_methods_use_write_guard() {
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert_eq!(guard_for(&method, "/tasks"), Guard::Write);
        }
        assert_eq!(guard_for(&Method::GET, "/tasks"), Guard::Open);
        assert_eq!(guard_for(&Method::OPTIONS, "/tasks"), Guard::Open);
    }

    #[test]
    fn key_comparison() {
        let key = SecretString::from("s3cret");
        assert!(key_matches(&key, Some("s3cret")));
        assert!(!key_matches(&key, Some("nope")));
        assert!(!key_matches(&key, Some("")));
        assert!(!key_matches(&key, None));
    }
}
