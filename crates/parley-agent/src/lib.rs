// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-turn orchestration for the Parley backend.
//!
//! The [`TurnOrchestrator`] is the central coordinator that:
//! - Persists the caller's message as a `user` turn
//! - Reloads the transcript and trims it with a [`ContextWindow`]
//! - Streams the model's reply into a [`StreamSink`](parley_core::StreamSink)
//! - Persists the assembled reply as an `assistant` turn
//!
//! Turns of one user are serialized through [`UserLocks`]; shutdown is
//! coordinated through a cancellation token from [`shutdown`].

pub mod orchestrator;
pub mod shutdown;
pub mod user_lock;

pub use orchestrator::{TurnOrchestrator, TurnSummary};
pub use parley_context::ContextWindow;
pub use user_lock::{UserLocks, UserTurnGuard};
