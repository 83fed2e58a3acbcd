// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley serve` command implementation.
//!
//! Opens SQLite storage, connects the OpenAI-compatible provider, and serves
//! the HTTP gateway until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use parley_agent::{ContextWindow, TurnOrchestrator, shutdown};
use parley_auth::AuthService;
use parley_config::ParleyConfig;
use parley_core::{
    ParleyError, PluginAdapter, ProviderAdapter, StorageAdapter, TranscriptStore, UserStore,
};
use parley_gateway::{GatewayState, start_server};
use parley_openai::OpenAiProvider;
use parley_storage::SqliteStorage;
use tracing::{info, warn};

/// Runs the `parley serve` command.
pub async fn run_serve(config: ParleyConfig) -> Result<(), ParleyError> {
    init_tracing(&config.server.log_level);

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = config.storage.database_path.as_str(), "storage ready");

    let provider = Arc::new(OpenAiProvider::new(&config.openai)?);
    info!(
        model = config.openai.model.as_str(),
        base_url = config.openai.base_url.as_str(),
        "provider ready"
    );

    let window = ContextWindow::from_config(&config.context);
    let orchestrator = TurnOrchestrator::new(
        Arc::clone(&storage) as Arc<dyn TranscriptStore>,
        Arc::clone(&provider) as Arc<dyn ProviderAdapter>,
    )
    .with_context_window(window);
    info!(policy = ?window, "context window configured");

    let auth = AuthService::new(Arc::clone(&storage) as Arc<dyn UserStore>)
        .with_deadline(Duration::from_secs(config.gateway.auth_timeout_secs));

    let cancel = shutdown::install_signal_handler()?;
    let state = GatewayState::new(
        orchestrator,
        auth,
        Arc::clone(&storage) as Arc<dyn TranscriptStore>,
        Arc::clone(&storage) as Arc<dyn PluginAdapter>,
        cancel,
    )
    .with_stream_buffer(config.gateway.stream_buffer);

    let served = start_server(&config.gateway, state).await;

    if let Err(e) = provider.shutdown().await {
        warn!(error = %e, "provider shutdown failed");
    }
    storage.close().await?;
    info!("parley serve shutdown complete");
    served
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
