//! Candidate scorer, reranker and explanation generator
//!
//! Scoring is pure math over a finalized profile plus externally supplied
//! candidate data; the reranker wraps it in bounded-parallel fetch-and-score
//! with a fail-soft deadline. All outputs are deterministic for a given
//! session/candidate-set pair.

pub mod explain;
pub mod rerank;
pub mod scorer;

pub use explain::Explanation;
pub use rerank::{rerank, RerankConfig};
pub use scorer::{importance_weights, score_candidate, ImportanceWeights, HIGH_WEIGHT_THRESHOLD};

use serde::Serialize;

/// Weights of the five score components in the overall score.
///
/// The regret component is a penalty, so it enters the sum as
/// `weight * (1 - regret)`. Defaults favor psychographic alignment while
/// keeping every component visible in the total.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWeights {
    pub psych: f64,
    pub mag: f64,
    pub satisfaction: f64,
    pub arch: f64,
    pub regret: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            psych: 0.30,
            mag: 0.15,
            satisfaction: 0.20,
            arch: 0.20,
            regret: 0.15,
        }
    }
}

/// The five named component scores, each in [0,1]
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Alignment between the user's importance weights and the candidate
    pub psych: f64,
    /// The candidate's own aggregate quality
    pub mag: f64,
    /// One minus aggregated regret over highly weighted attributes
    pub satisfaction: f64,
    /// Fit against the chosen archetype's rule set
    pub arch: f64,
    /// Raw aggregated regret penalty, reported for transparency
    pub regret: f64,
}

/// Per-candidate output of the reranker
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankResult {
    pub candidate_id: String,
    pub name: String,
    /// Weighted overall score
    pub score: f64,
    pub components: Components,
    /// Convergence-derived confidence times data completeness
    pub confidence: f64,
    pub explanation: Explanation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ScoreWeights::default();
        let sum = w.psych + w.mag + w.satisfaction + w.arch + w.regret;
        assert!((sum - 1.0).abs() < 1e-12);
    }
}
