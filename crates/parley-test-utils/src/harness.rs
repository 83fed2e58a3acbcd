// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end turn testing.
//!
//! `TestHarness` wires a temp-file SQLite store, a [`MockProvider`] and a
//! [`TurnOrchestrator`] together, with one registered user ready to chat.

use std::sync::Arc;

use parley_agent::{TurnOrchestrator, TurnSummary};
use parley_config::model::StorageConfig;
use parley_context::ContextWindow;
use parley_core::{
    ParleyError, ProviderAdapter, StorageAdapter, TranscriptStore, Turn, UserId, UserStore,
};
use parley_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;

use crate::flaky_store::FlakyStore;
use crate::mock_provider::{MockProvider, MockReply};
use crate::mock_sink::RecordingSink;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    window: ContextWindow,
    fail_append: Option<usize>,
    fail_loads: bool,
    stall_appends: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            window: ContextWindow::Unbounded,
            fail_append: None,
            fail_loads: false,
            stall_appends: false,
        }
    }

    /// Queue scripted provider replies.
    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Use a context-window policy other than unbounded.
    pub fn with_context_window(mut self, window: ContextWindow) -> Self {
        self.window = window;
        self
    }

    /// Make the `n`th transcript append (1-based) fail.
    pub fn failing_append(mut self, n: usize) -> Self {
        self.fail_append = Some(n);
        self
    }

    /// Make every transcript load fail.
    pub fn failing_loads(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    /// Make every transcript append hang until the turn is cancelled.
    pub fn stalling_appends(mut self) -> Self {
        self.stall_appends = true;
        self
    }

    /// Build the harness: temp database, one user, orchestrator.
    pub async fn build(self) -> Result<TestHarness, ParleyError> {
        let temp_dir = tempfile::TempDir::new().map_err(ParleyError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let storage = Arc::new(storage);

        let user = storage
            .create_user("tester@example.com", "$argon2id$placeholder")
            .await?;

        let mut flaky = FlakyStore::new(Arc::clone(&storage) as Arc<dyn TranscriptStore>);
        if let Some(n) = self.fail_append {
            flaky = flaky.failing_append(n);
        }
        if self.fail_loads {
            flaky = flaky.failing_loads();
        }
        if self.stall_appends {
            flaky = flaky.stalling_appends();
        }
        let store = Arc::new(flaky);

        let provider = Arc::new(MockProvider::with_replies(self.replies));
        let orchestrator = TurnOrchestrator::new(
            Arc::clone(&store) as Arc<dyn TranscriptStore>,
            Arc::clone(&provider) as Arc<dyn ProviderAdapter>,
        )
        .with_context_window(self.window);

        Ok(TestHarness {
            user_id: user.id,
            storage,
            store,
            provider,
            orchestrator,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired turn pipeline backed by a temporary database.
pub struct TestHarness {
    user_id: UserId,
    storage: Arc<SqliteStorage>,
    store: Arc<FlakyStore>,
    provider: Arc<MockProvider>,
    orchestrator: TurnOrchestrator,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The pre-registered user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Registers another user and returns its id.
    pub async fn add_user(&self, email: &str) -> Result<UserId, ParleyError> {
        Ok(self
            .storage
            .create_user(email, "$argon2id$placeholder")
            .await?
            .id)
    }

    pub fn orchestrator(&self) -> &TurnOrchestrator {
        &self.orchestrator
    }

    pub fn provider(&self) -> &Arc<MockProvider> {
        &self.provider
    }

    /// The failure-injecting store the orchestrator writes through.
    pub fn store(&self) -> &Arc<FlakyStore> {
        &self.store
    }

    /// The underlying SQLite storage, bypassing failure injection.
    pub fn storage(&self) -> &Arc<SqliteStorage> {
        &self.storage
    }

    /// Runs one turn for the pre-registered user into a fresh recording sink.
    pub async fn send(&self, message: &str) -> (Result<TurnSummary, ParleyError>, RecordingSink) {
        let mut sink = RecordingSink::new();
        let result = self
            .orchestrator
            .run_turn(self.user_id, message, &mut sink, &CancellationToken::new())
            .await;
        (result, sink)
    }

    /// The pre-registered user's transcript, read straight from storage.
    pub async fn transcript(&self) -> Result<Vec<Turn>, ParleyError> {
        self.storage.load_transcript(self.user_id).await
    }
}
