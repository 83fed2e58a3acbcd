// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure-injecting transcript store wrapper.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use parley_core::{ParleyError, Role, TranscriptStore, Turn, UserId};

/// Delegates to an inner store but fails chosen operations.
pub struct FlakyStore {
    inner: Arc<dyn TranscriptStore>,
    fail_append: Option<usize>,
    fail_loads: bool,
    stall_appends: bool,
    appends: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn TranscriptStore>) -> Self {
        Self {
            inner,
            fail_append: None,
            fail_loads: false,
            stall_appends: false,
            appends: AtomicUsize::new(0),
        }
    }

    /// Fails the `n`th append (1-based). Other appends go through.
    pub fn failing_append(mut self, n: usize) -> Self {
        self.fail_append = Some(n);
        self
    }

    /// Fails every transcript load.
    pub fn failing_loads(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    /// Makes every append hang forever, like a locked database.
    pub fn stalling_appends(mut self) -> Self {
        self.stall_appends = true;
        self
    }

    /// Append attempts so far, including failed ones.
    pub fn appends(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptStore for FlakyStore {
    async fn append_turn(
        &self,
        user_id: UserId,
        role: Role,
        content: &str,
    ) -> Result<Turn, ParleyError> {
        let attempt = self.appends.fetch_add(1, Ordering::SeqCst) + 1;
        if self.stall_appends {
            std::future::pending::<()>().await;
        }
        if self.fail_append == Some(attempt) {
            return Err(ParleyError::storage(format!(
                "injected failure on append {attempt}"
            )));
        }
        self.inner.append_turn(user_id, role, content).await
    }

    async fn load_transcript(&self, user_id: UserId) -> Result<Vec<Turn>, ParleyError> {
        if self.fail_loads {
            return Err(ParleyError::storage("injected load failure"));
        }
        self.inner.load_transcript(user_id).await
    }
}
