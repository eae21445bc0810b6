//! Session lifecycle: state machine, in-memory arena, orchestration
//!
//! A session is the single unit of mutable state in the engine. The store
//! keeps one lockable entry per session id; the engine mutates a session only
//! while holding that entry's lock, which serializes concurrent calls against
//! the same id.

pub mod machine;
pub mod store;

pub use machine::{
    AnswerOutcome, EngineConfig, FinishMeta, FinishOutcome, SessionEngine, StartOutcome,
    ALGORITHM_ID,
};
pub use store::{spawn_session_sweep_task, SessionStore, DEFAULT_SESSION_TTL_SECS};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::profile::{HardConstraint, TraitVector};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// Created, first question not yet selected
    Init,
    /// Serving questions
    InProgress,
    /// Questionnaire over (converged, exhausted or dealbreaker); awaiting finish
    Terminal,
    /// Results produced; only expiry remains
    Finished,
}

/// One user's elicitation session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session identifier
    pub id: Uuid,
    /// Current psychographic profile
    pub vector: TraitVector,
    /// Question ids answered so far, in order
    pub answered: Vec<String>,
    /// Position of the pending question in canonical order
    pub cursor: usize,
    /// Entropy of the vector after the latest answer
    pub convergence: f64,
    /// Lifecycle state
    pub state: SessionState,
    /// Hard constraints recorded from answers
    pub constraints: Vec<HardConstraint>,
    /// Opaque client context supplied at start
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub context: serde_json::Value,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time, drives expiry
    pub touched_at: DateTime<Utc>,
}

impl Session {
    /// Fresh session at the neutral prior
    pub fn new(context: serde_json::Value) -> Self {
        let now = Utc::now();
        let vector = TraitVector::neutral();
        Self {
            id: Uuid::new_v4(),
            convergence: vector.entropy(),
            vector,
            answered: Vec::new(),
            cursor: 0,
            state: SessionState::Init,
            constraints: Vec::new(),
            context,
            created_at: now,
            touched_at: now,
        }
    }

    /// Record a mutation for expiry tracking
    pub fn touch(&mut self) {
        self.touched_at = Utc::now();
    }
}
