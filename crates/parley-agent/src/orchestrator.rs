// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The turn orchestrator: save, load context, stream, save.

use std::sync::Arc;

use futures::StreamExt;
use parley_context::ContextWindow;
use parley_core::{ParleyError, ProviderAdapter, Role, StreamSink, TranscriptStore, Turn, UserId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::user_lock::UserLocks;

/// Outcome of a completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSummary {
    pub user_turn: Turn,
    pub assistant_turn: Turn,
    /// Number of fragments delivered to the sink.
    pub fragments: usize,
}

/// Runs chat turns against a transcript store and a model provider.
///
/// The orchestrator holds no per-turn state; one instance serves every
/// concurrent request. Turns of the same user are serialized.
#[derive(Clone)]
pub struct TurnOrchestrator {
    store: Arc<dyn TranscriptStore>,
    provider: Arc<dyn ProviderAdapter>,
    window: ContextWindow,
    locks: UserLocks,
}

impl TurnOrchestrator {
    pub fn new(store: Arc<dyn TranscriptStore>, provider: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            store,
            provider,
            window: ContextWindow::default(),
            locks: UserLocks::new(),
        }
    }

    /// Sets the policy that trims the transcript before generation.
    pub fn with_context_window(mut self, window: ContextWindow) -> Self {
        self.window = window;
        self
    }

    pub fn context_window(&self) -> ContextWindow {
        self.window
    }

    /// Per-user lock registry, exposed for inspection.
    pub fn locks(&self) -> &UserLocks {
        &self.locks
    }

    /// Runs one chat turn for `user_id`.
    ///
    /// Persists `message` as a `user` turn, streams the model's reply into
    /// `sink` fragment by fragment, then persists the concatenated reply as
    /// an `assistant` turn. The terminal marker is left to the caller.
    ///
    /// # Errors
    ///
    /// - [`ParleyError::Validation`] for an empty message; nothing is stored.
    /// - [`ParleyError::Storage`] when the user turn or the context cannot be
    ///   read or written; the model is not called.
    /// - [`ParleyError::Delivery`] when the sink fails or `cancel` fires; the
    ///   upstream stream is dropped and no assistant turn is written.
    /// - [`ParleyError::Upstream`] / [`ParleyError::Timeout`] when generation
    ///   fails; the partial reply is discarded.
    /// - [`ParleyError::ReplyNotRecorded`] when the reply was fully delivered
    ///   but the assistant turn could not be written.
    pub async fn run_turn(
        &self,
        user_id: UserId,
        message: &str,
        sink: &mut dyn StreamSink,
        cancel: &CancellationToken,
    ) -> Result<TurnSummary, ParleyError> {
        if message.trim().is_empty() {
            return Err(ParleyError::Validation("message required".to_string()));
        }

        let _turn = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(cancelled("waiting for the previous turn"));
            }
            guard = self.locks.acquire(user_id) => guard,
        };
        if cancel.is_cancelled() {
            return Err(cancelled("waiting for the previous turn"));
        }

        let user_turn = until_cancelled(
            cancel,
            "saving the message",
            self.store.append_turn(user_id, Role::User, message),
        )
        .await
        .inspect_err(|e| warn!(user_id = %user_id, error = %e, "failed to save user turn"))?;
        debug!(user_id = %user_id, turn_id = user_turn.id, "user turn saved");

        let transcript = until_cancelled(
            cancel,
            "loading context",
            self.store.load_transcript(user_id),
        )
        .await?;
        let context = self.window.select(transcript);

        let mut fragments = until_cancelled(
            cancel,
            "connecting to the model",
            self.provider.stream_completion(&context),
        )
        .await
        .inspect_err(|e| warn!(user_id = %user_id, error = %e, "model request failed"))?;

        let mut reply = String::new();
        let mut delivered = 0usize;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(user_id = %user_id, delivered, "turn cancelled mid-stream");
                    return Err(cancelled("streaming"));
                }
                next = fragments.next() => next,
            };

            match next {
                Some(Ok(fragment)) => {
                    reply.push_str(&fragment);
                    let sent = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => Err(cancelled("streaming")),
                        sent = sink.send(&fragment) => sent,
                    };
                    if let Err(e) = sent {
                        warn!(user_id = %user_id, delivered, error = %e, "delivery failed, discarding reply");
                        return Err(e);
                    }
                    delivered += 1;
                }
                Some(Err(e)) => {
                    warn!(
                        user_id = %user_id,
                        delivered,
                        error = %e,
                        "generation failed mid-stream, discarding partial reply"
                    );
                    return Err(e);
                }
                None => break,
            }
        }
        drop(fragments);

        if cancel.is_cancelled() {
            return Err(cancelled("saving the reply"));
        }

        let assistant_turn = match self
            .store
            .append_turn(user_id, Role::Assistant, &reply)
            .await
        {
            Ok(turn) => turn,
            Err(e) => {
                error!(
                    user_id = %user_id,
                    reply_len = reply.len(),
                    error = %e,
                    "assistant reply delivered but not recorded"
                );
                return Err(ParleyError::ReplyNotRecorded {
                    source: Box::new(e),
                });
            }
        };

        info!(
            user_id = %user_id,
            fragments = delivered,
            reply_len = reply.len(),
            "turn complete"
        );
        Ok(TurnSummary {
            user_turn,
            assistant_turn,
            fragments: delivered,
        })
    }
}

fn cancelled(stage: &str) -> ParleyError {
    ParleyError::delivery(format!("turn cancelled while {stage}"))
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    stage: &str,
    work: impl Future<Output = Result<T, ParleyError>>,
) -> Result<T, ParleyError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(cancelled(stage)),
        result = work => result,
    }
}
