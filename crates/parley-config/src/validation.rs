// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, non-zero limits, and URL schemes.

use crate::diagnostic::ConfigError;
use crate::model::{ContextPolicy, ParleyConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.gateway.port == 0 {
        fail("gateway.port must be non-zero".to_string());
    }

    if config.gateway.auth_timeout_secs == 0 {
        fail("gateway.auth_timeout_secs must be at least 1".to_string());
    }

    if config.gateway.stream_buffer == 0 {
        fail("gateway.stream_buffer must be at least 1".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let base_url = config.openai.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "openai.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if config.openai.model.trim().is_empty() {
        fail("openai.model must not be empty".to_string());
    }

    if config.openai.request_timeout_secs == 0 {
        fail("openai.request_timeout_secs must be at least 1".to_string());
    }

    match config.context.policy {
        ContextPolicy::MostRecent if config.context.max_turns == 0 => {
            fail("context.max_turns must be at least 1 for the most_recent policy".to_string());
        }
        ContextPolicy::TokenBudget if config.context.token_budget == 0 => {
            fail(
                "context.token_budget must be at least 1 for the token_budget policy".to_string(),
            );
        }
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
