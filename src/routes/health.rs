//! Health check endpoints
//!
//! Liveness returns 200 whenever the process is up. Readiness additionally
//! reports session-arena and catalog stats; with the embedded candidate
//! store there is no external dependency to probe, so readiness mirrors
//! liveness with diagnostics attached.

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;

use super::json_response;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    healthy: bool,
    status: &'static str,
    version: &'static str,
    uptime: u64,
    mode: &'static str,
    node_id: String,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadinessResponse {
    ready: bool,
    active_sessions: usize,
    questions: usize,
    archetypes: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionResponse {
    version: &'static str,
    git_commit: &'static str,
    git_commit_full: &'static str,
    built_at: &'static str,
}

/// Liveness probe
pub fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    json_response(&HealthResponse {
        healthy: true,
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        mode: if state.args.dev_mode { "development" } else { "production" },
        node_id: state.args.node_id.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Readiness probe with engine diagnostics
pub fn readiness_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    json_response(&ReadinessResponse {
        ready: true,
        active_sessions: state.engine.store().len(),
        questions: state.engine.questions().len(),
        archetypes: state.engine.archetypes().len(),
    })
}

/// Build metadata captured by build.rs
pub fn version_info() -> Response<Full<Bytes>> {
    json_response(&VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        git_commit: env!("GIT_COMMIT_SHORT"),
        git_commit_full: env!("GIT_COMMIT_FULL"),
        built_at: env!("BUILD_TIMESTAMP"),
    })
}
