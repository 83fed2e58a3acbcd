// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the chat API.
//!
//! Handles GET|POST /api/chat/message, GET /api/chat/history, GET /health.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::Response;
use parley_core::{HealthStatus, Role};
use serde::{Deserialize, Serialize};

use crate::auth::CallerId;
use crate::error::ApiError;
use crate::server::GatewayState;
use crate::sse;

/// Message text, from the query string or a JSON body.
#[derive(Debug, Default, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// One entry of GET /api/chat/history.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Binary version.
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /api/chat/message?message=...
pub async fn get_message(
    State(state): State<GatewayState>,
    CallerId(user_id): CallerId,
    Query(query): Query<MessageRequest>,
) -> Result<Response, ApiError> {
    let message = require_message(query.message)?;
    Ok(sse::stream_turn(state, user_id, message).await)
}

/// POST /api/chat/message
///
/// Takes `{"message": ...}` from the body; falls back to the query string
/// when the body is empty.
pub async fn post_message(
    State(state): State<GatewayState>,
    CallerId(user_id): CallerId,
    Query(query): Query<MessageRequest>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<MessageRequest>(&body)
            .map_err(|e| ApiError::bad_request(format!("invalid JSON body: {e}")))?
            .message
    };
    let message = require_message(from_body.or(query.message))?;
    Ok(sse::stream_turn(state, user_id, message).await)
}

/// GET /api/chat/history
pub async fn get_history(
    State(state): State<GatewayState>,
    CallerId(user_id): CallerId,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let turns = state.transcripts.load_transcript(user_id).await?;
    Ok(Json(
        turns
            .into_iter()
            .map(|turn| HistoryEntry {
                id: turn.id,
                role: turn.role,
                content: turn.content,
                created_at: turn.created_at,
            })
            .collect(),
    ))
}

/// GET /health
///
/// Unauthenticated. Reports `degraded` when storage does not answer.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let status = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => "ok",
        Ok(other) => {
            tracing::warn!(status = ?other, "storage health check not healthy");
            "degraded"
        }
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            "degraded"
        }
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

fn require_message(message: Option<String>) -> Result<String, ApiError> {
    match message {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::bad_request("message required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_request_accepts_missing_field() {
        let req: MessageRequest = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_none());
    }

    #[test]
    fn blank_message_is_rejected() {
        assert!(require_message(None).is_err());
        assert!(require_message(Some("  ".into())).is_err());
        assert_eq!(require_message(Some(" hi ".into())).unwrap(), " hi ");
    }

    #[test]
    fn history_entry_serializes_lowercase_role() {
        let entry = HistoryEntry {
            id: 3,
            role: Role::Assistant,
            content: "Hi".into(),
            created_at: "2026-01-01T00:00:00.000000Z".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["id"], 3);
    }
}
