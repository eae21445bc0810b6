//! Configuration for Attune
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use uuid::Uuid;

use crate::profile::DEFAULT_CONVERGENCE_THRESHOLD;
use crate::scoring::{RerankConfig, ScoreWeights};
use crate::session::{EngineConfig, DEFAULT_SESSION_TTL_SECS};

/// Attune - adaptive preference-elicitation and reranking engine
#[derive(Parser, Debug, Clone)]
#[command(name = "attune")]
#[command(about = "Adaptive preference-elicitation and reranking engine for phone recommendations")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (disables request signing checks)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Shared secret for HMAC request signing (required outside dev mode)
    #[arg(long, env = "SIGNING_SECRET")]
    pub signing_secret: Option<String>,

    /// Entropy threshold below which a profile counts as converged
    #[arg(long, env = "CONVERGENCE_THRESHOLD", default_value_t = DEFAULT_CONVERGENCE_THRESHOLD)]
    pub convergence_threshold: f64,

    /// End the questionnaire immediately on a dealbreaker answer
    #[arg(long, env = "DEALBREAKER_TERMINATES", default_value = "true")]
    pub dealbreaker_terminates: bool,

    /// Allow finish on sessions still in progress.
    /// Deliberate relaxation of the state machine for clients that let
    /// users bail out early; leave off unless the UI depends on it.
    #[arg(long, env = "FORCE_FINISH", default_value = "false")]
    pub force_finish: bool,

    /// Session idle time-to-live in seconds
    #[arg(long, env = "SESSION_TTL_SECS", default_value_t = DEFAULT_SESSION_TTL_SECS)]
    pub session_ttl_secs: u64,

    /// Sweep interval for expired sessions, in seconds
    #[arg(long, env = "SESSION_SWEEP_SECS", default_value = "60")]
    pub session_sweep_secs: u64,

    /// Concurrent candidate fetch-and-score operations
    #[arg(long, env = "WORKER_COUNT", default_value = "4")]
    pub worker_count: usize,

    /// Deadline for fetching one candidate's data, in milliseconds
    #[arg(long, env = "FETCH_TIMEOUT_MS", default_value = "2000")]
    pub fetch_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration before startup
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.signing_secret.is_none() {
            return Err("SIGNING_SECRET is required outside dev mode".to_string());
        }
        if let Some(secret) = &self.signing_secret {
            if secret.len() < 16 {
                return Err("SIGNING_SECRET must be at least 16 bytes".to_string());
            }
        }
        if !(0.0..=1.0).contains(&self.convergence_threshold) {
            return Err(format!(
                "CONVERGENCE_THRESHOLD must be in [0,1], got {}",
                self.convergence_threshold
            ));
        }
        if self.worker_count == 0 {
            return Err("WORKER_COUNT must be at least 1".to_string());
        }
        if self.fetch_timeout_ms == 0 {
            return Err("FETCH_TIMEOUT_MS must be positive".to_string());
        }
        Ok(())
    }

    /// Engine policy derived from these arguments
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            convergence_threshold: self.convergence_threshold,
            dealbreaker_terminates: self.dealbreaker_terminates,
            force_finish: self.force_finish,
            session_ttl: Duration::from_secs(self.session_ttl_secs),
            rerank: RerankConfig {
                worker_count: self.worker_count,
                fetch_timeout_ms: self.fetch_timeout_ms,
                weights: ScoreWeights::default(),
            },
        }
    }
}
