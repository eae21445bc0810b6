//! Bounded-parallel rerank pipeline
//!
//! Fetches candidate data from the external store with a per-candidate
//! deadline, filters by the session's hard constraints, scores the survivors
//! concurrently and merges into one deterministic ranking. Fetch failures and
//! timeouts drop the candidate with a warning; they never fail the request.

use std::cmp::Ordering;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::catalog::Archetype;
use crate::data::{Candidate, CandidateStore};
use crate::profile::{HardConstraint, TraitVector};

use super::explain::explain;
use super::scorer::score_candidate;
use super::{RerankResult, ScoreWeights};

/// Tuning for the rerank pipeline
#[derive(Debug, Clone)]
pub struct RerankConfig {
    /// Maximum concurrent fetch-and-score operations
    pub worker_count: usize,
    /// Deadline for fetching one candidate's data
    pub fetch_timeout_ms: u64,
    /// Component weights for the overall score
    pub weights: ScoreWeights,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            fetch_timeout_ms: 2000,
            weights: ScoreWeights::default(),
        }
    }
}

/// True if the candidate survives every recorded hard constraint
fn passes_constraints(candidate: &Candidate, constraints: &[HardConstraint]) -> bool {
    constraints.iter().all(|constraint| match constraint {
        HardConstraint::EcosystemLock { ecosystem } => candidate.ecosystem == *ecosystem,
        HardConstraint::BudgetCeiling { max_price } => candidate.price <= *max_price,
        HardConstraint::RegretSensitive { attribute } => {
            // Unprocessed candidates pass; their confidence already carries
            // the missing-data penalty.
            match &candidate.regret {
                Some(regret) => regret
                    .get(*attribute)
                    .map(|e| !e.frequency.is_severe())
                    .unwrap_or(true),
                None => true,
            }
        }
    })
}

/// Score every eligible candidate and return the ranked, explained list.
///
/// `convergence_confidence` is the session's `1 - entropy` at finish time;
/// each result's confidence is that value scaled by the candidate's data
/// completeness.
pub async fn rerank(
    store: &dyn CandidateStore,
    archetype: &Archetype,
    vector: &TraitVector,
    constraints: &[HardConstraint],
    convergence_confidence: f64,
    config: &RerankConfig,
) -> Vec<RerankResult> {
    let ids = match store.list_candidate_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Candidate listing failed, returning empty ranking: {}", e);
            return Vec::new();
        }
    };

    let fetch_timeout = Duration::from_millis(config.fetch_timeout_ms);
    let concurrency = config.worker_count.max(1);

    let mut results: Vec<RerankResult> = stream::iter(ids)
        .map(|id| async move {
            match tokio::time::timeout(fetch_timeout, store.get_candidate_data(&id)).await {
                Ok(Ok(candidate)) => Some(candidate),
                Ok(Err(e)) => {
                    warn!(candidate = %id, "Dropping candidate, data fetch failed: {}", e);
                    None
                }
                Err(_) => {
                    warn!(candidate = %id, timeout_ms = config.fetch_timeout_ms,
                        "Dropping candidate, data fetch deadline exceeded");
                    None
                }
            }
        })
        .buffer_unordered(concurrency)
        .filter_map(|c| async move { c })
        .filter(|candidate| {
            let eligible = passes_constraints(candidate, constraints);
            if !eligible {
                debug!(candidate = %candidate.id, "Excluded by hard constraint");
            }
            async move { eligible }
        })
        .map(|candidate| {
            let scored = score_candidate(vector, archetype, &candidate, &config.weights);
            let explanation = explain(&scored.weights, archetype, &candidate, constraints);
            RerankResult {
                candidate_id: candidate.id,
                name: candidate.name,
                score: scored.overall,
                components: scored.components,
                confidence: (convergence_confidence * scored.completeness).clamp(0.0, 1.0),
                explanation,
            }
        })
        .collect()
        .await;

    // Deterministic order: score desc, confidence desc, id asc.
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    results
}
