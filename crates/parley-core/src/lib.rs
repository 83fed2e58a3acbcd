// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley chat backend.
//!
//! This crate provides the trait definitions, error types, and domain types
//! shared by the whole workspace: the transcript store, the model provider,
//! and the stream sink that the turn orchestrator composes.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ParleyError;
pub use types::{AdapterType, HealthStatus, Role, Turn, User, UserId};

pub use traits::{
    FragmentStream, PluginAdapter, ProviderAdapter, StorageAdapter, StreamSink, TranscriptStore,
    UserStore,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [AdapterType::Provider, AdapterType::Storage] {
            let s = variant.to_string();
            assert_eq!(AdapterType::from_str(&s).unwrap(), variant);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(HealthStatus::Degraded("slow".into()), healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), healthy);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_transcript_store<T: TranscriptStore>() {}
        fn _assert_user_store<T: UserStore>() {}
        fn _assert_stream_sink<T: StreamSink>() {}
    }
}
