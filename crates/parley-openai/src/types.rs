// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat Completions API request, chunk and error types.

use parley_core::{Role, Turn};
use serde::{Deserialize, Serialize};

// --- Request types ---

/// A request to `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Always `true` for this client; incremental delivery is the only mode.
    pub stream: bool,
}

/// One message in the request's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: provider_role(turn.role),
            content: turn.content.clone(),
        }
    }
}

/// Maps a transcript role to the provider's role vocabulary.
pub fn provider_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    }
}

// --- Streaming chunk types ---

/// A `chat.completion.chunk` object carried by one SSE `data:` line.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatChunk {
    /// The text increment of the first choice, if it carries any text.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|s| !s.is_empty())
    }
}

// --- Error types ---

/// Error envelope returned by OpenAI-compatible servers, both as a non-2xx
/// body and as an in-stream `data:` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

/// Some routers send a bare string instead of an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiError {
    Detailed {
        message: String,
        #[serde(rename = "type", default)]
        type_: Option<String>,
    },
    Plain(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Detailed {
                message,
                type_: Some(kind),
            } => write!(f, "{kind}: {message}"),
            ApiError::Detailed { message, .. } => f.write_str(message),
            ApiError::Plain(message) => f.write_str(message),
        }
    }
}
