// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Parley configuration system.

use std::io::Write;

use parley_config::diagnostic::ConfigError;
use parley_config::model::{ContextPolicy, ParleyConfig};
use parley_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};
use serial_test::serial;

/// A file with every section and key deserializes into the matching fields.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[server]
log_level = "debug"

[gateway]
host = "127.0.0.1"
port = 9000
auth_timeout_secs = 3
stream_buffer = 8

[storage]
database_path = "/tmp/parley-test.db"
wal_mode = false

[openai]
api_key = "hf_abc"
base_url = "http://localhost:8080/v1"
model = "tiny-model"
request_timeout_secs = 10
max_retries = 0

[context]
policy = "most_recent"
max_turns = 12
token_budget = 900
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.log_level, "debug");
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.auth_timeout_secs, 3);
    assert_eq!(config.gateway.stream_buffer, 8);
    assert_eq!(config.storage.database_path, "/tmp/parley-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.openai.api_key.as_deref(), Some("hf_abc"));
    assert_eq!(config.openai.base_url, "http://localhost:8080/v1");
    assert_eq!(config.openai.model, "tiny-model");
    assert_eq!(config.openai.request_timeout_secs, 10);
    assert_eq!(config.openai.max_retries, 0);
    assert_eq!(config.context.policy, ContextPolicy::MostRecent);
    assert_eq!(config.context.max_turns, 12);
    assert_eq!(config.context.token_budget, 900);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    let defaults = ParleyConfig::default();

    assert_eq!(config.server.log_level, "info");
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 8050);
    assert_eq!(config.storage.database_path, defaults.storage.database_path);
    assert!(config.storage.wal_mode);
    assert!(config.openai.api_key.is_none());
    assert_eq!(config.openai.model, "meta-llama/Meta-Llama-3-8B-Instruct");
    assert_eq!(config.openai.max_retries, 1);
    assert_eq!(config.context.policy, ContextPolicy::Unbounded);
}

#[test]
fn unknown_key_gets_suggestion_and_valid_keys() {
    let toml = r#"
[gateway]
prot = 9000
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key should be rejected");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, span, .. } if {
            key == "prot"
                && suggestion.as_deref() == Some("port")
                && valid_keys.contains("auth_timeout_secs")
                && span.is_some()
        })
    });
    assert!(found, "expected UnknownKey for `prot`, got: {errors:?}");
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[telemetry]
enabled = true
"#;

    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let msg = err.to_string();
    assert!(
        msg.contains("unknown field") || msg.contains("telemetry"),
        "got: {msg}"
    );
}

#[test]
fn invalid_type_is_reported_with_key_path() {
    let toml = r#"
[gateway]
port = "eighty"
"#;

    let errors = load_and_validate_str(toml).expect_err("string port should be rejected");
    let found = errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port")));
    assert!(found, "expected InvalidType for port, got: {errors:?}");
}

#[test]
fn unknown_context_policy_is_rejected() {
    let toml = r#"
[context]
policy = "everything"
"#;
    assert!(load_and_validate_str(toml).is_err());
}

#[test]
fn validation_errors_surface_through_load_and_validate() {
    let toml = r#"
[openai]
base_url = "ftp://models.example"

[context]
policy = "token_budget"
token_budget = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert!(messages.iter().any(|m| m.contains("openai.base_url")));
    assert!(messages.iter().any(|m| m.contains("context.token_budget")));
}

#[test]
fn diagnostics_render_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "modle".to_string(),
        suggestion: Some("model".to_string()),
        valid_keys: "api_key, base_url, model".to_string(),
        span: None,
        src: None,
    };

    let help = error.help().expect("unknown key has help").to_string();
    assert!(help.contains("did you mean `model`"), "got: {help}");
    assert!(error.code().is_some());

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("modle"));
}

#[test]
#[serial]
fn env_vars_override_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[gateway]\nport = 9000\n\n[openai]\nmodel = \"from-file\"").unwrap();

    // SAFETY: serialized with the other env-mutating tests.
    unsafe {
        std::env::set_var("PARLEY_OPENAI_API_KEY", "hf_from_env");
        std::env::set_var("PARLEY_GATEWAY_PORT", "9100");
        std::env::set_var("PARLEY_CONTEXT_MAX_TURNS", "7");
    }

    let result = load_config_from_path(file.path());

    unsafe {
        std::env::remove_var("PARLEY_OPENAI_API_KEY");
        std::env::remove_var("PARLEY_GATEWAY_PORT");
        std::env::remove_var("PARLEY_CONTEXT_MAX_TURNS");
    }

    let config = result.expect("env overrides should merge");
    assert_eq!(config.openai.api_key.as_deref(), Some("hf_from_env"));
    assert_eq!(config.openai.model, "from-file");
    assert_eq!(config.gateway.port, 9100);
    assert_eq!(config.context.max_turns, 7);
}

#[test]
#[serial]
fn path_loader_points_diagnostics_at_the_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[storage]\ndatabse_path = \"x.db\"").unwrap();

    let errors = load_and_validate_path(file.path()).expect_err("typo should be rejected");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, src, .. } if {
            key == "databse_path"
                && suggestion.as_deref() == Some("database_path")
                && src.is_some()
        })
    });
    assert!(found, "got: {errors:?}");
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    let config = load_config_from_path(std::path::Path::new("/nonexistent/parley.toml"))
        .expect("missing file is skipped");
    assert_eq!(config.gateway.port, 8050);
}
