//! Shared error taxonomy and result alias for Attune
//!
//! Every fallible boundary in the engine maps onto one of these variants.
//! Numeric paths (vector math, scoring) are total and never produce errors;
//! only identifier/state mismatches and the auth precondition are rejected.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine-level errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or unknown identifier in a request (unknown question/answer id,
    /// bad request body). Surfaces as a 422 with the offending field named.
    #[error("Validation failed for {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// Operation not allowed in the session's current lifecycle state
    /// (answer on a finished/unknown session, finish on a non-terminal session).
    /// Surfaces as a 409.
    #[error("Invalid session state: {0}")]
    State(String),

    /// Candidate attribute/regret data missing or not retrieved in time.
    /// Soft failure: lowers result confidence, never surfaces to the caller.
    #[error("Incomplete candidate data: {0}")]
    DataIncomplete(String),

    /// Request signature or timestamp invalid. Rejected before the engine runs.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Unexpected internal failure (channel closed, serialization bug)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stable machine-readable code for the API error envelope
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "VALIDATION_ERROR",
            EngineError::State(_) => "STATE_ERROR",
            EngineError::DataIncomplete(_) => "DATA_INCOMPLETE",
            EngineError::Auth(_) => "AUTH_ERROR",
            EngineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code this error maps to at the API boundary
    pub fn http_status(&self) -> u16 {
        match self {
            EngineError::Validation { .. } => 422,
            EngineError::State(_) => 409,
            // DataIncomplete is never returned to callers; if it ever escapes
            // it is a bug, treat it as internal.
            EngineError::DataIncomplete(_) => 500,
            EngineError::Auth(_) => 401,
            EngineError::Internal(_) => 500,
        }
    }

    /// Convenience constructor for validation failures
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            EngineError::validation("answerId", "unknown").code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(EngineError::State("finished".into()).code(), "STATE_ERROR");
        assert_eq!(EngineError::Auth("stale".into()).http_status(), 401);
        assert_eq!(
            EngineError::validation("questionId", "mismatch").http_status(),
            422
        );
        assert_eq!(EngineError::State("not terminal".into()).http_status(), 409);
    }
}
