//! HTTP routes for Attune

pub mod catalog_routes;
pub mod health;
pub mod session_routes;

pub use catalog_routes::{handle_archetypes, handle_questions};
pub use health::{health_check, readiness_check, version_info};
pub use session_routes::handle_session_request;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::types::EngineError;

/// API error envelope
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: &'static str,
}

/// Build successful JSON response
pub fn json_response<T: Serialize>(data: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(data).unwrap_or_default();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-cache")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| fallback_error_response())
}

/// Build a JSON error response
pub fn error_response(status: StatusCode, message: &str, code: &'static str) -> Response<Full<Bytes>> {
    let error = ApiError {
        error: message.to_string(),
        code,
    };
    let body = serde_json::to_vec(&error).unwrap_or_default();
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-cache")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| fallback_error_response())
}

/// Map an engine error onto its HTTP envelope
pub fn error_to_response(e: &EngineError) -> Response<Full<Bytes>> {
    let status =
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, &e.to_string(), e.code())
}

/// 404 with the path named
pub fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    error_response(
        StatusCode::NOT_FOUND,
        &format!("no route for {path}"),
        "NOT_FOUND",
    )
}

/// CORS preflight
pub fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header(
            "Access-Control-Allow-Headers",
            "Content-Type, X-Attune-Timestamp, X-Attune-Signature",
        )
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| fallback_error_response())
}

fn fallback_error_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(r#"{"error":"Internal error"}"#)));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_to_response_maps_status() {
        let r = error_to_response(&EngineError::Auth("bad".into()));
        assert_eq!(r.status(), StatusCode::UNAUTHORIZED);
        let r = error_to_response(&EngineError::State("bad".into()));
        assert_eq!(r.status(), StatusCode::CONFLICT);
        let r = error_to_response(&EngineError::validation("answerId", "bad"));
        assert_eq!(r.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
