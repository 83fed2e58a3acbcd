// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for upstream chat-completion models.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Turn;

/// A lazy, finite, non-restartable sequence of assistant text fragments.
///
/// Each poll yields one of three outcomes: `Some(Ok(fragment))`,
/// `None` (normal end of generation) or `Some(Err(_))` (upstream failure
/// or deadline expiry, after which the stream yields nothing more).
/// Dropping the stream releases the upstream connection.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ParleyError>> + Send>>;

/// Adapter for LLM provider integrations.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Starts a streamed completion over the given transcript.
    ///
    /// Errors returned here happen before any fragment was produced
    /// (connection refused, non-2xx status, request deadline).
    async fn stream_completion(&self, transcript: &[Turn]) -> Result<FragmentStream, ParleyError>;
}
