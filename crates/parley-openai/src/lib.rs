// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider adapter for the Parley chat backend.
//!
//! Implements [`ProviderAdapter`] over any server speaking the Chat
//! Completions streaming protocol (OpenAI, Hugging Face router, vLLM, ...).

pub mod client;
pub mod sse;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parley_config::model::OpenAiConfig;
use parley_core::{
    AdapterType, FragmentStream, HealthStatus, ParleyError, PluginAdapter, ProviderAdapter, Turn,
};
use secrecy::SecretString;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::sse::{EventStream, StreamEvent};
use crate::types::{ChatMessage, ChatRequest};

/// Chat-completion provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiProvider {
    client: OpenAiClient,
    model: String,
    deadline: Duration,
}

impl OpenAiProvider {
    /// Creates a provider from the `[openai]` configuration section.
    pub fn new(config: &OpenAiConfig) -> Result<Self, ParleyError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = OpenAiClient::new(&api_key, &config.base_url)?
            .with_max_retries(config.max_retries);

        info!(
            model = config.model,
            endpoint = client.endpoint(),
            "OpenAI-compatible provider initialized"
        );

        Ok(Self::with_client(
            client,
            config.model.clone(),
            Duration::from_secs(config.request_timeout_secs),
        ))
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: OpenAiClient, model: String, deadline: Duration) -> Self {
        Self {
            client,
            model,
            deadline,
        }
    }

    fn to_chat_request(&self, transcript: &[Turn]) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: transcript.iter().map(ChatMessage::from).collect(),
            stream: true,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        // Probing the endpoint would spend tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        debug!("OpenAI-compatible provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn stream_completion(&self, transcript: &[Turn]) -> Result<FragmentStream, ParleyError> {
        let request = self.to_chat_request(transcript);
        let deadline = Instant::now() + self.deadline;

        let events = tokio::time::timeout_at(deadline, self.client.stream_chat(&request))
            .await
            .map_err(|_| ParleyError::Timeout {
                duration: self.deadline,
            })??;

        debug!(turns = transcript.len(), "completion stream opened");
        Ok(fragments_until(events, deadline, self.deadline))
    }
}

/// Turns parsed events into fragments, ending at `[DONE]`, at the first
/// error, or with [`ParleyError::Timeout`] once `deadline` passes.
fn fragments_until(events: EventStream, deadline: Instant, budget: Duration) -> FragmentStream {
    let fragments = stream::unfold(Some(events), move |state| async move {
        let mut events = state?;
        match tokio::time::timeout_at(deadline, events.next()).await {
            Err(_) => Some((Err(ParleyError::Timeout { duration: budget }), None)),
            Ok(None) | Ok(Some(Ok(StreamEvent::Done))) => None,
            Ok(Some(Ok(StreamEvent::Delta(text)))) => Some((Ok(text), Some(events))),
            Ok(Some(Err(e))) => Some((Err(e), None)),
        }
    });
    Box::pin(fragments)
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: Option<&str>) -> Result<SecretString, ParleyError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(SecretString::from(key));
    }

    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| {
            ParleyError::Config(
                "API key not found. Set openai.api_key in config or the OPENAI_API_KEY environment variable.".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{Role, UserId};
    use secrecy::ExposeSecret;
    use serial_test::serial;

    fn turn(id: i64, role: Role, content: &str) -> Turn {
        Turn {
            id,
            user_id: UserId::new(1).unwrap(),
            role,
            content: content.into(),
            created_at: format!("2026-01-01T00:00:0{id}.000000Z"),
        }
    }

    fn scripted(events: Vec<Result<StreamEvent, ParleyError>>) -> EventStream {
        Box::pin(stream::iter(events))
    }

    #[test]
    fn resolve_api_key_prefers_config() {
        let key = resolve_api_key(Some("hf_config")).unwrap();
        assert_eq!(key.expose_secret(), "hf_config");
    }

    #[test]
    #[serial]
    fn resolve_api_key_falls_back_to_env() {
        // SAFETY: serialized with the other env-mutating tests.
        unsafe { std::env::set_var("OPENAI_API_KEY", "hf_env") };
        let from_empty = resolve_api_key(Some(""));
        let from_none = resolve_api_key(None);
        unsafe { std::env::remove_var("OPENAI_API_KEY") };

        assert_eq!(from_empty.unwrap().expose_secret(), "hf_env");
        assert_eq!(from_none.unwrap().expose_secret(), "hf_env");
    }

    #[test]
    #[serial]
    fn missing_api_key_is_config_error() {
        unsafe { std::env::remove_var("OPENAI_API_KEY") };
        let err = resolve_api_key(None).unwrap_err();
        assert!(matches!(err, ParleyError::Config(_)));
    }

    #[test]
    fn request_preserves_transcript_order_and_roles() {
        let client = OpenAiClient::new(&SecretString::from("k"), "http://localhost").unwrap();
        let provider = OpenAiProvider::with_client(client, "m".into(), Duration::from_secs(5));
        let request = provider.to_chat_request(&[
            turn(1, Role::System, "be brief"),
            turn(2, Role::User, "hello"),
            turn(3, Role::Assistant, "hi"),
        ]);

        let roles: Vec<&str> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, ["system", "user", "assistant"]);
        assert_eq!(request.messages[1].content, "hello");
        assert!(request.stream);
    }

    #[tokio::test]
    async fn fragments_stop_at_done() {
        let events = scripted(vec![
            Ok(StreamEvent::Delta("a".into())),
            Ok(StreamEvent::Done),
            Ok(StreamEvent::Delta("ignored".into())),
        ]);
        let deadline = Instant::now() + Duration::from_secs(5);
        let out: Vec<_> = fragments_until(events, deadline, Duration::from_secs(5))
            .collect()
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap(), "a");
    }

    #[tokio::test]
    async fn fragments_end_after_first_error() {
        let events = scripted(vec![
            Ok(StreamEvent::Delta("a".into())),
            Err(ParleyError::upstream("boom")),
            Ok(StreamEvent::Delta("b".into())),
        ]);
        let deadline = Instant::now() + Duration::from_secs(5);
        let out: Vec<_> = fragments_until(events, deadline, Duration::from_secs(5))
            .collect()
            .await;
        assert_eq!(out.len(), 2);
        assert!(out[1].as_ref().unwrap_err().is_upstream());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_stream_times_out() {
        let events: EventStream = Box::pin(
            stream::iter(vec![Ok(StreamEvent::Delta("a".into()))]).chain(stream::pending()),
        );
        let budget = Duration::from_secs(60);
        let deadline = Instant::now() + budget;
        let out: Vec<_> = fragments_until(events, deadline, budget).collect().await;

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap(), "a");
        assert!(matches!(
            out[1].as_ref().unwrap_err(),
            ParleyError::Timeout { duration } if *duration == budget
        ));
    }
}
