//! Session API routes
//!
//! - `POST /api/v1/session/start` - create a session, serve the first question
//! - `POST /api/v1/session/{id}/answer` - apply one answer
//! - `POST /api/v1/session/{id}/finish` - classify, rerank, return results
//!
//! Responses echo the full question payload alongside the next question id
//! so the UI never needs a second round trip.

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::Question;
use crate::server::AppState;
use crate::session::{FinishMeta, FinishOutcome};
use crate::scoring::RerankResult;
use crate::types::EngineError;

use super::{error_to_response, json_response, not_found_response};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StartRequest {
    #[serde(default)]
    context: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse<'a> {
    session_id: Uuid,
    next_question_id: String,
    question: Option<&'a Question>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest {
    question_id: String,
    answer_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnswerResponse<'a> {
    next_question_id: Option<String>,
    confidence: f64,
    question: Option<&'a Question>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FinishResponse {
    recommendations: Vec<RerankResult>,
    meta: FinishMeta,
}

/// Parsed session route
enum SessionRoute<'a> {
    Start,
    Answer(&'a str),
    Finish(&'a str),
}

impl<'a> SessionRoute<'a> {
    fn parse(path: &'a str) -> Option<Self> {
        let rest = path.strip_prefix("/api/v1/session")?;
        match rest {
            "/start" => Some(SessionRoute::Start),
            _ => {
                let rest = rest.strip_prefix('/')?;
                let (id, action) = rest.split_once('/')?;
                match action {
                    "answer" => Some(SessionRoute::Answer(id)),
                    "finish" => Some(SessionRoute::Finish(id)),
                    _ => None,
                }
            }
        }
    }
}

/// Dispatch a pre-authenticated session API request
pub async fn handle_session_request(
    state: Arc<AppState>,
    path: &str,
    body: &[u8],
) -> Response<Full<Bytes>> {
    match SessionRoute::parse(path) {
        Some(SessionRoute::Start) => handle_start(state, body),
        Some(SessionRoute::Answer(id)) => handle_answer(state, id, body).await,
        Some(SessionRoute::Finish(id)) => handle_finish(state, id).await,
        None => not_found_response(path),
    }
}

fn parse_session_id(raw: &str) -> Result<Uuid, EngineError> {
    Uuid::parse_str(raw)
        .map_err(|_| EngineError::validation("sessionId", format!("{raw} is not a valid id")))
}

fn handle_start(state: Arc<AppState>, body: &[u8]) -> Response<Full<Bytes>> {
    // An empty body means an empty context.
    let request: StartRequest = if body.is_empty() {
        StartRequest::default()
    } else {
        match serde_json::from_slice(body) {
            Ok(r) => r,
            Err(e) => {
                return error_to_response(&EngineError::validation("context", e.to_string()))
            }
        }
    };

    match state.engine.start(request.context) {
        Ok(outcome) => {
            let question = state.engine.question(&outcome.next_question_id);
            json_response(&StartResponse {
                session_id: outcome.session_id,
                next_question_id: outcome.next_question_id.clone(),
                question,
            })
        }
        Err(e) => error_to_response(&e),
    }
}

async fn handle_answer(state: Arc<AppState>, raw_id: &str, body: &[u8]) -> Response<Full<Bytes>> {
    let session_id = match parse_session_id(raw_id) {
        Ok(id) => id,
        Err(e) => return error_to_response(&e),
    };
    let request: AnswerRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => return error_to_response(&EngineError::validation("body", e.to_string())),
    };

    match state
        .engine
        .submit_answer(&session_id, &request.question_id, &request.answer_id)
        .await
    {
        Ok(outcome) => {
            let question = outcome
                .next_question_id
                .as_deref()
                .and_then(|id| state.engine.question(id));
            json_response(&AnswerResponse {
                next_question_id: outcome.next_question_id.clone(),
                confidence: outcome.confidence,
                question,
            })
        }
        Err(e) => error_to_response(&e),
    }
}

async fn handle_finish(state: Arc<AppState>, raw_id: &str) -> Response<Full<Bytes>> {
    let session_id = match parse_session_id(raw_id) {
        Ok(id) => id,
        Err(e) => return error_to_response(&e),
    };

    match state.engine.finish(&session_id).await {
        Ok(FinishOutcome {
            recommendations,
            meta,
        }) => json_response(&FinishResponse {
            recommendations,
            meta,
        }),
        Err(e) => error_to_response(&e),
    }
}
