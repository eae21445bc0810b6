//! Read-only catalog dumps
//!
//! Serve the canonical question list and the archetype catalog for UI and
//! debugging. Both are static tables; responses are fully deterministic.

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::{Archetype, Question};
use crate::profile::TraitGroup;
use crate::server::AppState;

use super::json_response;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsResponse<'a> {
    questions: Vec<&'a Question>,
    trait_groups: Vec<TraitGroupInfo>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TraitGroupInfo {
    group: TraitGroup,
    description: &'static str,
    traits: Vec<crate::profile::Trait>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArchetypesResponse<'a> {
    archetypes: Vec<&'a Archetype>,
}

/// `GET /api/v1/questions`
pub fn handle_questions(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let questions: Vec<&Question> = state.engine.questions().iter().collect();
    let trait_groups = TraitGroup::ALL
        .iter()
        .map(|g| TraitGroupInfo {
            group: *g,
            description: g.description(),
            traits: g.traits(),
        })
        .collect();
    json_response(&QuestionsResponse {
        questions,
        trait_groups,
    })
}

/// `GET /api/v1/archetypes`
pub fn handle_archetypes(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let archetypes: Vec<&Archetype> = state.engine.archetypes().iter().collect();
    json_response(&ArchetypesResponse { archetypes })
}
