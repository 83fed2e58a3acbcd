// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::routing::{get, post};
use parley_agent::TurnOrchestrator;
use parley_agent::shutdown::drain_turns;
use parley_auth::AuthService;
use parley_config::model::GatewayConfig;
use parley_core::{ParleyError, PluginAdapter, TranscriptStore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{auth, handlers};

/// How long shutdown waits for in-flight turns to wind down.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: TurnOrchestrator,
    pub auth: AuthService,
    /// Read side of the transcript, for history.
    pub transcripts: Arc<dyn TranscriptStore>,
    /// Probed by the health endpoint.
    pub storage: Arc<dyn PluginAdapter>,
    pub health: HealthState,
    /// Parent of every turn's cancellation token.
    pub shutdown: CancellationToken,
    /// In-flight turn tasks.
    pub turns: TaskTracker,
    /// Capacity of each turn's fragment channel.
    pub stream_buffer: usize,
}

impl GatewayState {
    pub fn new(
        orchestrator: TurnOrchestrator,
        auth: AuthService,
        transcripts: Arc<dyn TranscriptStore>,
        storage: Arc<dyn PluginAdapter>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            orchestrator,
            auth,
            transcripts,
            storage,
            health: HealthState {
                start_time: Instant::now(),
            },
            shutdown,
            turns: TaskTracker::new(),
            stream_buffer: 32,
        }
    }

    pub fn with_stream_buffer(mut self, capacity: usize) -> Self {
        self.stream_buffer = capacity;
        self
    }
}

/// Builds the gateway router:
/// - POST /api/auth/register, POST /api/auth/login
/// - GET|POST /api/chat/message (SSE)
/// - GET /api/chat/history
/// - GET /health (unauthenticated)
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/chat/message",
            get(handlers::get_message).post(handlers::post_message),
        )
        .route("/api/chat/history", get(handlers::get_history))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Serves until `state.shutdown` is cancelled, then stops accepting
/// connections and waits briefly for in-flight turns to abort.
pub async fn start_server(config: &GatewayConfig, state: GatewayState) -> Result<(), ParleyError> {
    let shutdown = state.shutdown.clone();
    let turns = state.turns.clone();
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ParleyError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| ParleyError::Internal(format!("gateway server error: {e}")))?;

    drain_turns(&turns, DRAIN_TIMEOUT).await;
    tracing::info!("gateway stopped");
    Ok(())
}
