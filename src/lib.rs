//! Attune - adaptive preference elicitation and reranking engine
//!
//! Attune walks a user through a short adaptive questionnaire, maintains a
//! 28-dimension psychographic trait vector as answers arrive, classifies the
//! converged profile into a buyer archetype, and reranks a phone catalog with
//! a five-component explainable score.
//!
//! ## Modules
//!
//! - **profile**: trait vector, answer deltas, locks and hard constraints
//! - **catalog**: question and archetype tables
//! - **session**: session arena, state machine and sweep task
//! - **classify**: archetype classification
//! - **scoring**: component scorer, explanations, parallel rerank
//! - **server / routes**: hyper HTTP surface with HMAC request signing

pub mod auth;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod data;
pub mod profile;
pub mod routes;
pub mod scoring;
pub mod server;
pub mod session;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{EngineError, Result};
