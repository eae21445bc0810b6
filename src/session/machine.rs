//! Session state machine
//!
//! Owns every session mutation. Each public operation takes the session's
//! entry lock for its full duration, so concurrent calls against one id are
//! serialized end to end. All trait math stays pure; only this module decides
//! when it runs.
//!
//! `finish` holds the lock across scoring. The `Finished` transition happens
//! strictly after the ranked list exists, so a cancelled or failed finish
//! leaves the session `Terminal` and retryable.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{Answer, ArchetypeCatalog, Question, QuestionCatalog};
use crate::classify::{classify, Classification};
use crate::data::CandidateStore;
use crate::profile::{AnswerEffect, HardConstraint};
use crate::scoring::{rerank, RerankConfig, RerankResult};
use crate::types::{EngineError, Result};

use super::store::{SessionStore, DEFAULT_SESSION_TTL_SECS};
use super::{Session, SessionState};

/// Identifier reported in finish metadata
pub const ALGORITHM_ID: &str = "attune-rerank-v1";

/// Engine policy knobs, derived from CLI args at startup
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Entropy threshold for early stopping
    pub convergence_threshold: f64,
    /// Whether a dealbreaker answer ends the questionnaire immediately
    pub dealbreaker_terminates: bool,
    /// Allow finish on an `InProgress` session. Deliberate relaxation for
    /// clients that let users bail out early; off by default.
    pub force_finish: bool,
    /// Session idle time-to-live
    pub session_ttl: Duration,
    /// Rerank pipeline tuning
    pub rerank: RerankConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            convergence_threshold: crate::profile::DEFAULT_CONVERGENCE_THRESHOLD,
            dealbreaker_terminates: true,
            force_finish: false,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            rerank: RerankConfig::default(),
        }
    }
}

/// Result of starting a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOutcome {
    pub session_id: Uuid,
    pub next_question_id: String,
}

/// Result of submitting one answer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// Null once the questionnaire is over
    pub next_question_id: Option<String>,
    /// `1 - entropy` after this answer
    pub confidence: f64,
}

/// Metadata attached to finish results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishMeta {
    pub algorithm: &'static str,
    pub primary_archetype: String,
    pub classification: Classification,
}

/// Result of finishing a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishOutcome {
    pub recommendations: Vec<RerankResult>,
    pub meta: FinishMeta,
}

/// The engine: catalogs, session arena and the external candidate store
pub struct SessionEngine {
    questions: Arc<QuestionCatalog>,
    archetypes: Arc<ArchetypeCatalog>,
    store: Arc<SessionStore>,
    candidates: Arc<dyn CandidateStore>,
    config: EngineConfig,
}

impl SessionEngine {
    pub fn new(
        questions: Arc<QuestionCatalog>,
        archetypes: Arc<ArchetypeCatalog>,
        store: Arc<SessionStore>,
        candidates: Arc<dyn CandidateStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            questions,
            archetypes,
            store,
            candidates,
            config,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Create a session at the neutral prior and select the first question
    pub fn start(&self, context: serde_json::Value) -> Result<StartOutcome> {
        let first = self
            .questions
            .at(0)
            .ok_or_else(|| EngineError::Internal("question catalog is empty".into()))?;

        let mut session = Session::new(context);
        session.state = SessionState::InProgress;
        let session_id = self.store.insert(session);

        info!(session = %session_id, "Session started");
        Ok(StartOutcome {
            session_id,
            next_question_id: first.id.to_string(),
        })
    }

    /// Apply one answer and decide what happens next
    pub async fn submit_answer(
        &self,
        session_id: &Uuid,
        question_id: &str,
        answer_id: &str,
    ) -> Result<AnswerOutcome> {
        let entry = self
            .store
            .get(session_id)
            .ok_or_else(|| EngineError::State(format!("unknown session {session_id}")))?;
        let mut session = entry.lock().await;

        match session.state {
            SessionState::Finished => {
                return Err(EngineError::State("session already finished".into()))
            }
            SessionState::Terminal => {
                return Err(EngineError::validation(
                    "questionId",
                    "questionnaire is over, no pending question",
                ))
            }
            SessionState::Init | SessionState::InProgress => {}
        }

        let pending = self
            .questions
            .at(session.cursor)
            .ok_or_else(|| EngineError::Internal("cursor past catalog end".into()))?;
        if pending.id != question_id {
            return Err(EngineError::validation(
                "questionId",
                format!("expected {}, got {question_id}", pending.id),
            ));
        }
        let answer = pending.answer(answer_id).ok_or_else(|| {
            EngineError::validation("answerId", format!("{answer_id} is not an option of {question_id}"))
        })?;

        self.apply_answer(&mut session, pending, answer);

        // Early stop: dealbreaker policy first, then convergence, then
        // catalog exhaustion.
        let dealbreaker_fired = answer.dealbreaker && self.config.dealbreaker_terminates;
        let converged = session.vector.has_converged(self.config.convergence_threshold);
        let exhausted = session.cursor + 1 >= self.questions.len();

        let next_question_id = if dealbreaker_fired || converged || exhausted {
            session.state = SessionState::Terminal;
            debug!(
                session = %session.id,
                convergence = session.convergence,
                dealbreaker = dealbreaker_fired,
                exhausted = exhausted,
                "Session terminal"
            );
            None
        } else {
            session.cursor += 1;
            self.questions
                .at(session.cursor)
                .map(|q| q.id.to_string())
        };

        session.touch();
        Ok(AnswerOutcome {
            next_question_id,
            confidence: (1.0 - session.convergence).clamp(0.0, 1.0),
        })
    }

    /// Classify, score and close out a terminal session
    pub async fn finish(&self, session_id: &Uuid) -> Result<FinishOutcome> {
        let entry = self
            .store
            .get(session_id)
            .ok_or_else(|| EngineError::State(format!("unknown session {session_id}")))?;
        let mut session = entry.lock().await;

        match session.state {
            SessionState::Terminal => {}
            SessionState::Finished => {
                return Err(EngineError::State("session already finished".into()))
            }
            SessionState::Init | SessionState::InProgress if self.config.force_finish => {
                warn!(session = %session.id, "Force-finishing a session still in progress");
                session.state = SessionState::Terminal;
            }
            SessionState::Init | SessionState::InProgress => {
                return Err(EngineError::State(
                    "session is not terminal; answer remaining questions first".into(),
                ));
            }
        }

        let (archetype, classification) = classify(&self.archetypes, &session.vector);
        let convergence_confidence = (1.0 - session.convergence).clamp(0.0, 1.0);

        let recommendations = rerank(
            self.candidates.as_ref(),
            archetype,
            &session.vector,
            &session.constraints,
            convergence_confidence,
            &self.config.rerank,
        )
        .await;

        // Only now is the session done; a cancelled rerank leaves it Terminal.
        session.state = SessionState::Finished;
        session.touch();
        info!(
            session = %session.id,
            archetype = archetype.id,
            results = recommendations.len(),
            "Session finished"
        );

        Ok(FinishOutcome {
            recommendations,
            meta: FinishMeta {
                algorithm: ALGORITHM_ID,
                primary_archetype: archetype.id.to_string(),
                classification,
            },
        })
    }

    /// Question payload for the UI, by id
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.by_id(question_id)
    }

    /// The canonical question catalog
    pub fn questions(&self) -> &QuestionCatalog {
        &self.questions
    }

    /// The archetype catalog
    pub fn archetypes(&self) -> &ArchetypeCatalog {
        &self.archetypes
    }

    fn apply_answer(&self, session: &mut Session, question: &Question, answer: &Answer) {
        // Numeric update first, then posterior locks override blending.
        session.vector = session.vector.apply_delta(answer.effect.delta());
        match &answer.effect {
            AnswerEffect::Adjust { .. } => {}
            AnswerEffect::AdjustWithLock { locks, .. } => {
                for (t, value) in locks {
                    session.vector = session.vector.with_locked(*t, *value);
                }
            }
            AnswerEffect::AdjustWithRegretTrigger { trigger, .. } => {
                // The trigger itself records the downstream filter; it must
                // not depend on the answer also carrying the constraint.
                let constraint = HardConstraint::RegretSensitive {
                    attribute: trigger.attribute,
                };
                if !session.constraints.contains(&constraint) {
                    session.constraints.push(constraint);
                }
                debug!(session = %session.id, attribute = ?trigger.attribute, "Regret trigger recorded");
            }
        }
        if let Some(constraint) = &answer.constraint {
            if !session.constraints.contains(constraint) {
                session.constraints.push(constraint.clone());
            }
        }
        session.answered.push(question.id.to_string());
        session.convergence = session.vector.entropy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryCandidateStore;

    fn engine_with(config: EngineConfig) -> SessionEngine {
        SessionEngine::new(
            Arc::new(QuestionCatalog::standard()),
            Arc::new(ArchetypeCatalog::standard()),
            Arc::new(SessionStore::new(config.session_ttl)),
            Arc::new(MemoryCandidateStore::with_seed_catalog()),
            config,
        )
    }

    fn engine() -> SessionEngine {
        engine_with(EngineConfig::default())
    }

    /// Drive a session to Terminal by answering every question with its
    /// first option, skipping dealbreakers.
    async fn drive_to_terminal(engine: &SessionEngine) -> Uuid {
        let start = engine.start(serde_json::Value::Null).unwrap();
        let mut next = Some(start.next_question_id);
        while let Some(qid) = next {
            let q = engine.question(&qid).unwrap();
            let answer = q
                .answers
                .iter()
                .find(|a| !a.dealbreaker)
                .unwrap_or(&q.answers[0]);
            let out = engine
                .submit_answer(&start.session_id, q.id, answer.id)
                .await
                .unwrap();
            next = out.next_question_id;
        }
        start.session_id
    }

    #[tokio::test]
    async fn test_start_serves_first_canonical_question() {
        let engine = engine();
        let out = engine.start(serde_json::Value::Null).unwrap();
        assert_eq!(out.next_question_id, "q-frustration");
    }

    #[tokio::test]
    async fn test_answer_unknown_session_is_state_error() {
        let engine = engine();
        let err = engine
            .submit_answer(&Uuid::new_v4(), "q-frustration", "a-lag")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "STATE_ERROR");
    }

    #[tokio::test]
    async fn test_answer_wrong_question_is_validation_error() {
        let engine = engine();
        let start = engine.start(serde_json::Value::Null).unwrap();
        let err = engine
            .submit_answer(&start.session_id, "q-budget", "a-budget-mid")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_answer_unknown_option_is_validation_error() {
        let engine = engine();
        let start = engine.start(serde_json::Value::Null).unwrap();
        let err = engine
            .submit_answer(&start.session_id, "q-frustration", "a-nope")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_finish_in_progress_is_state_error() {
        let engine = engine();
        let start = engine.start(serde_json::Value::Null).unwrap();
        let err = engine.finish(&start.session_id).await.unwrap_err();
        assert_eq!(err.code(), "STATE_ERROR");
    }

    #[tokio::test]
    async fn test_force_finish_policy_relaxes_state_check() {
        let engine = engine_with(EngineConfig {
            force_finish: true,
            ..EngineConfig::default()
        });
        let start = engine.start(serde_json::Value::Null).unwrap();
        let out = engine.finish(&start.session_id).await.unwrap();
        assert_eq!(out.meta.algorithm, ALGORITHM_ID);
    }

    #[tokio::test]
    async fn test_dealbreaker_answer_ends_questionnaire() {
        let engine = engine();
        let start = engine.start(serde_json::Value::Null).unwrap();
        engine
            .submit_answer(&start.session_id, "q-frustration", "a-lag")
            .await
            .unwrap();
        // q-ecosystem's locked-ios answer is a dealbreaker.
        let out = engine
            .submit_answer(&start.session_id, "q-ecosystem", "a-locked-ios")
            .await
            .unwrap();
        assert!(out.next_question_id.is_none());
        let finish = engine.finish(&start.session_id).await.unwrap();
        // Ecosystem lock filters the catalog down to iOS phones.
        for r in &finish.recommendations {
            assert!(
                r.explanation.matches.iter().any(|m| m.contains("iOS")),
                "{} missing ecosystem match",
                r.candidate_id
            );
        }
    }

    #[tokio::test]
    async fn test_dealbreaker_policy_can_be_disabled() {
        let engine = engine_with(EngineConfig {
            dealbreaker_terminates: false,
            ..EngineConfig::default()
        });
        let start = engine.start(serde_json::Value::Null).unwrap();
        engine
            .submit_answer(&start.session_id, "q-frustration", "a-lag")
            .await
            .unwrap();
        let out = engine
            .submit_answer(&start.session_id, "q-ecosystem", "a-locked-ios")
            .await
            .unwrap();
        assert_eq!(out.next_question_id.as_deref(), Some("q-budget"));
    }

    #[tokio::test]
    async fn test_full_walk_terminates_and_finishes() {
        let engine = engine();
        let id = drive_to_terminal(&engine).await;
        let out = engine.finish(&id).await.unwrap();
        assert!(!out.recommendations.is_empty());
        assert!(!out.meta.primary_archetype.is_empty());
        // Ranked descending by score.
        for pair in out.recommendations.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_finish_twice_is_state_error() {
        let engine = engine();
        let id = drive_to_terminal(&engine).await;
        engine.finish(&id).await.unwrap();
        let err = engine.finish(&id).await.unwrap_err();
        assert_eq!(err.code(), "STATE_ERROR");
    }

    #[tokio::test]
    async fn test_answer_after_finish_is_state_error() {
        let engine = engine();
        let id = drive_to_terminal(&engine).await;
        engine.finish(&id).await.unwrap();
        let err = engine
            .submit_answer(&id, "q-frustration", "a-lag")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "STATE_ERROR");
    }

    #[tokio::test]
    async fn test_posterior_lock_overrides_blending() {
        let engine = engine();
        let start = engine.start(serde_json::Value::Null).unwrap();
        engine
            .submit_answer(&start.session_id, "q-frustration", "a-lag")
            .await
            .unwrap();
        engine
            .submit_answer(&start.session_id, "q-ecosystem", "a-flexible")
            .await
            .unwrap();
        let entry = engine.store().get(&start.session_id).unwrap();
        let session = entry.lock().await;
        assert_eq!(
            session.vector.get(crate::profile::Trait::EcosystemAttachment),
            0.0
        );
    }

    #[tokio::test]
    async fn test_regret_trigger_records_filter_without_explicit_constraint() {
        use crate::catalog::{Answer, Question};
        use crate::data::Attribute;
        use crate::profile::{RegretTrigger, Trait, TraitDelta};

        let engine = engine();
        let question = Question {
            id: "q-trigger-only",
            prompt: "trigger without a duplicated constraint",
            answers: vec![Answer {
                id: "a-trigger-only",
                text: "trigger only",
                effect: AnswerEffect::AdjustWithRegretTrigger {
                    delta: TraitDelta::new().with(Trait::RegretAversion, 0.2),
                    trigger: RegretTrigger {
                        attribute: Attribute::Camera,
                    },
                },
                constraint: None,
                dealbreaker: false,
            }],
        };

        let mut session = Session::new(serde_json::Value::Null);
        engine.apply_answer(&mut session, &question, &question.answers[0]);
        assert!(session.constraints.contains(&HardConstraint::RegretSensitive {
            attribute: Attribute::Camera,
        }));
    }

    #[tokio::test]
    async fn test_regret_answer_records_constraint_once() {
        let engine = engine();
        let start = engine.start(serde_json::Value::Null).unwrap();
        for (qid, aid) in [
            ("q-frustration", "a-lag"),
            ("q-ecosystem", "a-flexible"),
            ("q-budget", "a-budget-mid"),
            ("q-camera-moment", "a-camera-confident"),
            ("q-day-shape", "a-day-heavy"),
            ("q-gaming", "a-gaming-casual"),
            ("q-regret", "a-regret-battery"),
        ] {
            engine.submit_answer(&start.session_id, qid, aid).await.unwrap();
        }
        let entry = engine.store().get(&start.session_id).unwrap();
        let session = entry.lock().await;
        let battery_filters = session
            .constraints
            .iter()
            .filter(|c| {
                matches!(c, HardConstraint::RegretSensitive {
                    attribute: crate::data::Attribute::Battery,
                })
            })
            .count();
        assert_eq!(battery_filters, 1);
    }

    #[tokio::test]
    async fn test_confidence_grows_as_profile_sharpens() {
        let engine = engine();
        let start = engine.start(serde_json::Value::Null).unwrap();
        let first = engine
            .submit_answer(&start.session_id, "q-frustration", "a-lag")
            .await
            .unwrap();
        let second = engine
            .submit_answer(&start.session_id, "q-ecosystem", "a-flexible")
            .await
            .unwrap();
        assert!(first.confidence > 0.0);
        assert!(second.confidence > first.confidence);
    }
}
