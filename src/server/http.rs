//! HTTP server implementation
//!
//! hyper http1 with TokioIo for async handling. Routing is a plain
//! method/path match; the session API collects the request body up front so
//! the signature check can run over `timestamp + body` before any engine
//! code touches the request.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::{RequestVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::catalog::{ArchetypeCatalog, QuestionCatalog};
use crate::config::Args;
use crate::data::{CandidateStore, MemoryCandidateStore};
use crate::routes;
use crate::session::{spawn_session_sweep_task, SessionEngine, SessionStore};
use crate::types::{EngineError, Result};

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// The elicitation/reranking engine
    pub engine: SessionEngine,
    /// Request signature verifier; None in dev mode
    pub verifier: Option<RequestVerifier>,
    /// Startup instant, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Build state with the embedded candidate catalog
    pub fn new(args: Args) -> Self {
        let store: Arc<dyn CandidateStore> = Arc::new(MemoryCandidateStore::with_seed_catalog());
        Self::with_candidate_store(args, store)
    }

    /// Build state against an external candidate store implementation
    pub fn with_candidate_store(args: Args, candidates: Arc<dyn CandidateStore>) -> Self {
        let engine_config = args.engine_config();
        let engine = SessionEngine::new(
            Arc::new(QuestionCatalog::standard()),
            Arc::new(ArchetypeCatalog::standard()),
            Arc::new(SessionStore::new(engine_config.session_ttl)),
            candidates,
            engine_config,
        );
        let verifier = if args.dev_mode {
            None
        } else {
            args.signing_secret
                .as_ref()
                .map(|s| RequestVerifier::new(s.as_bytes().to_vec()))
        };
        Self {
            args,
            engine,
            verifier,
            started_at: Instant::now(),
        }
    }
}

/// Run the server until the process exits
pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Attune listening on {} as node {}",
        state.args.listen, state.args.node_id
    );
    if state.args.dev_mode {
        warn!("Development mode enabled - request signing disabled");
    }

    spawn_session_sweep_task(
        Arc::clone(state.engine.store()),
        Duration::from_secs(state.args.session_sweep_secs),
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Verify the HMAC precondition for a mutating request
fn check_signature(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<()> {
    let Some(verifier) = &state.verifier else {
        return Ok(());
    };
    let timestamp = headers
        .get(TIMESTAMP_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| EngineError::Auth(format!("missing {TIMESTAMP_HEADER} header")))?;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| EngineError::Auth(format!("missing {SIGNATURE_HEADER} header")))?;
    verifier.verify(timestamp, signature, body, chrono::Utc::now().timestamp())
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state))
        }

        // Readiness probe
        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            routes::readiness_check(Arc::clone(&state))
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // Read-only catalog dumps for UI/debug
        (Method::GET, "/api/v1/questions") => routes::handle_questions(Arc::clone(&state)),
        (Method::GET, "/api/v1/archetypes") => routes::handle_archetypes(Arc::clone(&state)),

        // CORS preflight
        (Method::OPTIONS, _) => routes::preflight_response(),

        // Session API: signature check runs over the collected body
        (Method::POST, p) if p.starts_with("/api/v1/session") => {
            let p = p.to_string();
            let headers = req.headers().clone();
            let body = req.into_body().collect().await?.to_bytes();

            match check_signature(&state, &headers, &body) {
                Ok(()) => routes::handle_session_request(Arc::clone(&state), &p, &body).await,
                Err(e) => {
                    warn!("[{}] rejected unsigned/invalid request to {}: {}", addr, p, e);
                    routes::error_to_response(&e)
                }
            }
        }

        _ => routes::not_found_response(&path),
    };

    Ok(response)
}
