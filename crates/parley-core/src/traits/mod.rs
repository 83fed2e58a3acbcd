// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Backend adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod provider;
pub mod sink;
pub mod storage;

pub use adapter::PluginAdapter;
pub use provider::{FragmentStream, ProviderAdapter};
pub use sink::StreamSink;
pub use storage::{StorageAdapter, TranscriptStore, UserStore};
