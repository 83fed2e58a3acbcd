// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Parley chat backend.
//!
//! Exposes registration and login, a streamed chat route that runs one
//! turn per request and relays fragments as Server-Sent Events, the
//! caller's history, and an unauthenticated health probe.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod sse;

pub use error::ApiError;
pub use server::{GatewayState, HealthState, router, start_server};
