// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for Chat Completions streaming responses.
//!
//! Converts a reqwest response byte stream into typed [`StreamEvent`]s using
//! the `eventsource-stream` crate for SSE protocol compliance.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use parley_core::ParleyError;

use crate::types::{ApiErrorResponse, ChatChunk};

/// Sentinel data payload that ends an OpenAI-style stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Events of an OpenAI-compatible completion stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A non-empty text increment.
    Delta(String),
    /// The `[DONE]` sentinel.
    Done,
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ParleyError>> + Send>>;

/// Parses a streaming response into [`StreamEvent`]s.
///
/// Chunks without text (role announcements, finish markers, usage) are
/// skipped. An in-stream error payload becomes an upstream error.
pub fn parse_sse_stream(response: reqwest::Response) -> EventStream {
    let events = response.bytes_stream().eventsource();

    let mapped = events.filter_map(|result| async move {
        match result {
            Ok(event) => parse_data(&event.data).transpose(),
            Err(e) => Some(Err(ParleyError::Upstream {
                message: format!("SSE stream error: {e}"),
                source: None,
            })),
        }
    });

    Box::pin(mapped)
}

/// Interprets one `data:` payload. `Ok(None)` means "nothing to emit".
pub fn parse_data(data: &str) -> Result<Option<StreamEvent>, ParleyError> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }
    if data == DONE_SENTINEL {
        return Ok(Some(StreamEvent::Done));
    }
    if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(data) {
        return Err(ParleyError::upstream(format!(
            "provider error during stream: {}",
            err.error
        )));
    }

    let chunk: ChatChunk = serde_json::from_str(data).map_err(|e| ParleyError::Upstream {
        message: format!("failed to parse completion chunk: {e}"),
        source: Some(Box::new(e)),
    })?;
    Ok(chunk.text().map(|text| StreamEvent::Delta(text.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves `sse_text` through wiremock to obtain a real reqwest::Response.
    async fn mock_sse_response(sse_text: &str) -> reqwest::Response {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_text.to_string()),
            )
            .mount(&server)
            .await;

        reqwest::get(server.uri()).await.unwrap()
    }

    async fn collect(sse_text: &str) -> Vec<Result<StreamEvent, ParleyError>> {
        parse_sse_stream(mock_sse_response(sse_text).await)
            .collect()
            .await
    }

    #[tokio::test]
    async fn parses_deltas_then_done() {
        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        );

        let events: Vec<StreamEvent> = collect(sse)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("Hi".into()),
                StreamEvent::Delta(" there".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn keeps_whitespace_and_newlines_inside_fragments() {
        let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"line one\\n  line two\"}}]}\n\ndata: [DONE]\n\n";
        let events = collect(sse).await;
        assert_eq!(
            events[0].as_ref().unwrap(),
            &StreamEvent::Delta("line one\n  line two".into())
        );
    }

    #[tokio::test]
    async fn error_payload_is_upstream_error() {
        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n\n",
            "data: {\"error\":{\"message\":\"context length exceeded\",\"type\":\"invalid_request_error\"}}\n\n",
        );
        let events = collect(sse).await;
        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        let err = events[1].as_ref().unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("context length exceeded"));
    }

    #[test]
    fn malformed_chunk_is_upstream_error() {
        let err = parse_data("{not json").unwrap_err();
        assert!(matches!(err, ParleyError::Upstream { .. }));
    }

    #[test]
    fn blank_data_is_ignored() {
        assert_eq!(parse_data("  ").unwrap(), None);
    }
}
