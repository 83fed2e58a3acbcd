// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley config` command implementation.

use parley_config::ParleyConfig;
use parley_core::ParleyError;

const REDACTED: &str = "[redacted]";

/// Renders the effective configuration as TOML, API key redacted.
pub fn render(config: &ParleyConfig) -> Result<String, ParleyError> {
    let mut shown = config.clone();
    if shown.openai.api_key.is_some() {
        shown.openai.api_key = Some(REDACTED.to_string());
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| ParleyError::Config(format!("failed to render configuration: {e}")))
}
