// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream sinks that record or refuse fragments.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use parley_core::{ParleyError, StreamSink};

/// Records every fragment it receives.
///
/// Can optionally cancel a token after a number of fragments, standing in
/// for a client that disconnects mid-stream.
#[derive(Debug, Default)]
pub struct RecordingSink {
    fragments: Vec<String>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels `token` right after the `n`th fragment is recorded.
    pub fn cancelling_after(n: usize, token: CancellationToken) -> Self {
        Self {
            fragments: Vec::new(),
            cancel_after: Some((n, token)),
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// All fragments joined in delivery order.
    pub fn text(&self) -> String {
        self.fragments.concat()
    }
}

#[async_trait]
impl StreamSink for RecordingSink {
    async fn send(&mut self, fragment: &str) -> Result<(), ParleyError> {
        self.fragments.push(fragment.to_string());
        if let Some((n, token)) = &self.cancel_after
            && self.fragments.len() >= *n
        {
            token.cancel();
        }
        Ok(())
    }
}

/// Accepts fragments until the `fail_on`th send (1-based), which fails
/// with a delivery error, as do all later sends.
#[derive(Debug)]
pub struct FailingSink {
    fail_on: usize,
    attempts: usize,
    delivered: Vec<String>,
}

impl FailingSink {
    pub fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            attempts: 0,
            delivered: Vec::new(),
        }
    }

    /// Fragments accepted before the failure.
    pub fn delivered(&self) -> &[String] {
        &self.delivered
    }

    /// Total send attempts, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

#[async_trait]
impl StreamSink for FailingSink {
    async fn send(&mut self, fragment: &str) -> Result<(), ParleyError> {
        self.attempts += 1;
        if self.attempts >= self.fail_on {
            return Err(ParleyError::delivery("client disconnected"));
        }
        self.delivered.push(fragment.to_string());
        Ok(())
    }
}
