// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Scripted model provider with call and stream accounting
//! - [`RecordingSink`] / [`FailingSink`] - Stream sinks for delivery tests
//! - [`FlakyStore`] - Transcript store wrapper that injects failures
//! - [`TestHarness`] - SQLite + mock provider + orchestrator, ready to run turns

pub mod flaky_store;
pub mod harness;
pub mod mock_provider;
pub mod mock_sink;

pub use flaky_store::FlakyStore;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_provider::{Ending, MockProvider, MockReply};
pub use mock_sink::{FailingSink, RecordingSink};
