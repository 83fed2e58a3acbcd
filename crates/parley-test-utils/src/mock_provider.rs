// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted model provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured replies,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use tokio::sync::Mutex;

use parley_core::{
    AdapterType, FragmentStream, HealthStatus, ParleyError, PluginAdapter, ProviderAdapter, Turn,
};

/// How a scripted reply ends after its fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ending {
    /// Normal end of stream.
    Done,
    /// An upstream error as the final item.
    Error(String),
    /// Never yields again.
    Stall,
}

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockReply {
    fragments: Vec<String>,
    ending: Ending,
    reject: Option<String>,
}

impl MockReply {
    /// A reply that yields `fragments` and ends normally.
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            ending: Ending::Done,
            reject: None,
        }
    }

    /// Yields `fragments`, then fails with an upstream error.
    pub fn failing_after<I, S>(fragments: I, message: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ending: Ending::Error(message.to_string()),
            ..Self::fragments(fragments)
        }
    }

    /// Yields `fragments`, then hangs until the stream is dropped.
    pub fn stalling_after<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ending: Ending::Stall,
            ..Self::fragments(fragments)
        }
    }

    /// The request fails before any stream is returned.
    pub fn rejected(message: &str) -> Self {
        Self {
            fragments: Vec::new(),
            ending: Ending::Done,
            reject: Some(message.to_string()),
        }
    }
}

/// A mock provider that returns scripted replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty, a single
/// `"mock response"` fragment is returned.
pub struct MockProvider {
    replies: Mutex<VecDeque<MockReply>>,
    contexts: Mutex<Vec<Vec<Turn>>>,
    calls: AtomicUsize,
    open_streams: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            contexts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            open_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn push_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Number of `stream_completion` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Streams handed out and not yet dropped.
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    /// Transcripts received, one per call.
    pub async fn contexts(&self) -> Vec<Vec<Turn>> {
        self.contexts.lock().await.clone()
    }

    async fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::fragments(["mock response"]))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the open-stream counter when the stream is dropped.
struct OpenStream(Arc<AtomicUsize>);

impl Drop for OpenStream {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn stream_completion(&self, transcript: &[Turn]) -> Result<FragmentStream, ParleyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().await.push(transcript.to_vec());

        let reply = self.next_reply().await;
        if let Some(message) = reply.reject {
            return Err(ParleyError::upstream(message));
        }

        let ending: FragmentStream = match reply.ending {
            Ending::Done => Box::pin(stream::empty::<Result<String, ParleyError>>()),
            Ending::Error(message) => Box::pin(stream::once(async move {
                Err::<String, _>(ParleyError::upstream(message))
            })),
            Ending::Stall => Box::pin(stream::pending::<Result<String, ParleyError>>()),
        };

        self.open_streams.fetch_add(1, Ordering::SeqCst);
        let open = OpenStream(Arc::clone(&self.open_streams));
        let fragments = stream::iter(reply.fragments.into_iter().map(Ok))
            .chain(ending)
            .map(move |item| {
                let _alive = &open;
                item
            });
        Ok(Box::pin(fragments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_reply_when_queue_empty() {
        let provider = MockProvider::new();
        let items: Vec<_> = provider
            .stream_completion(&[])
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "mock response");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn failing_reply_ends_with_upstream_error() {
        let provider = MockProvider::with_replies(vec![MockReply::failing_after(["a"], "boom")]);
        let items: Vec<_> = provider
            .stream_completion(&[])
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        assert!(items[1].as_ref().unwrap_err().is_upstream());
    }

    #[tokio::test]
    async fn dropping_stream_is_observed() {
        let provider = MockProvider::with_replies(vec![MockReply::stalling_after(["a"])]);
        let stream = provider.stream_completion(&[]).await.unwrap();
        assert_eq!(provider.open_streams(), 1);
        drop(stream);
        assert_eq!(provider.open_streams(), 0);
    }

    #[tokio::test]
    async fn rejected_reply_fails_before_streaming() {
        let provider = MockProvider::with_replies(vec![MockReply::rejected("no")]);
        assert!(provider.stream_completion(&[]).await.is_err());
        assert_eq!(provider.open_streams(), 0);
        assert_eq!(provider.calls(), 1);
    }
}
