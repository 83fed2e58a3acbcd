// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events streaming for `/api/chat/message`.
//!
//! Each turn runs on its own task and pushes frames into a bounded channel
//! that backs the SSE response body.
//!
//! SSE event format:
//! ```text
//! data: {"delta":"partial content here"}
//!
//! data: [DONE]
//! ```
//!
//! A failed turn ends with an error event instead of `[DONE]`:
//! ```text
//! event: error
//! data: {"error":"upstream error: ..."}
//! ```
//!
//! Dropping the response body (client disconnect) cancels the turn.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::{self, Stream, StreamExt};
use parley_core::{ParleyError, StreamSink, UserId};
use tokio::sync::mpsc;
use tokio_util::sync::DropGuard;
use tracing::{debug, warn};

use crate::error::{ApiError, public_message};
use crate::server::GatewayState;

/// Terminal marker sent after a successful turn.
pub const DONE_MARKER: &str = "[DONE]";

/// One unit of the response stream.
#[derive(Debug)]
pub enum Frame {
    Delta(String),
    Done,
    Failed(ParleyError),
}

impl Frame {
    fn into_event(self) -> Event {
        match self {
            Frame::Delta(text) => {
                Event::default().data(serde_json::json!({ "delta": text }).to_string())
            }
            Frame::Done => Event::default().data(DONE_MARKER),
            Frame::Failed(err) => Event::default()
                .event("error")
                .data(serde_json::json!({ "error": public_message(&err) }).to_string()),
        }
    }
}

/// Sink that forwards fragments into the response channel.
pub struct ChannelSink {
    tx: mpsc::Sender<Frame>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Frame>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl StreamSink for ChannelSink {
    async fn send(&mut self, fragment: &str) -> Result<(), ParleyError> {
        self.tx
            .send(Frame::Delta(fragment.to_string()))
            .await
            .map_err(|_| ParleyError::delivery("client disconnected"))
    }
}

/// Starts a turn and answers with its event stream.
///
/// Failures that happen before the first fragment (storage, connection to
/// the model) are answered with a plain JSON error and a matching status.
pub async fn stream_turn(state: GatewayState, user_id: UserId, message: String) -> Response {
    let (tx, mut rx) = mpsc::channel(state.stream_buffer.max(1));
    let turn_token = state.shutdown.child_token();
    let guard = turn_token.clone().drop_guard();

    let orchestrator = state.orchestrator.clone();
    state.turns.spawn(async move {
        let mut sink = ChannelSink::new(tx.clone());
        let terminal = match orchestrator
            .run_turn(user_id, &message, &mut sink, &turn_token)
            .await
        {
            Ok(_) => Frame::Done,
            Err(ParleyError::Delivery { message }) => {
                debug!(user_id = %user_id, reason = message.as_str(), "turn abandoned by client");
                return;
            }
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "turn failed");
                Frame::Failed(err)
            }
        };
        // The receiver may already be gone; nothing left to do then.
        let _ = tx.send(terminal).await;
    });

    match rx.recv().await {
        Some(Frame::Failed(err)) => ApiError::from(err).into_response(),
        Some(first) => sse_response(first, rx, guard).into_response(),
        None => ApiError::from(ParleyError::Internal("turn ended without a result".into()))
            .into_response(),
    }
}

fn sse_response(
    first: Frame,
    rx: mpsc::Receiver<Frame>,
    guard: DropGuard,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rest = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let frame = rx.recv().await?;
        Some((Ok::<_, Infallible>(frame.into_event()), (rx, guard)))
    });
    let events = stream::once(async move { Ok::<_, Infallible>(first.into_event()) }).chain(rest);
    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_sink_reports_disconnect() {
        let (tx, rx) = mpsc::channel(1);
        let mut sink = ChannelSink::new(tx);
        drop(rx);
        let err = sink.send("lost").await.unwrap_err();
        assert!(matches!(err, ParleyError::Delivery { .. }));
    }

    #[tokio::test]
    async fn channel_sink_forwards_fragments() {
        let (tx, mut rx) = mpsc::channel(2);
        let mut sink = ChannelSink::new(tx);
        sink.send("Hi").await.unwrap();
        assert!(matches!(rx.recv().await, Some(Frame::Delta(text)) if text == "Hi"));
    }
}
