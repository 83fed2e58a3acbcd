// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery channel toward the caller of a chat turn.

use async_trait::async_trait;

use crate::error::ParleyError;

/// Write-only destination for assistant fragments.
///
/// The terminal marker is not part of this contract: the transport writes
/// it after the turn returns.
#[async_trait]
pub trait StreamSink: Send {
    /// Delivers one fragment. Fails with [`ParleyError::Delivery`] once the
    /// channel can no longer accept data.
    async fn send(&mut self, fragment: &str) -> Result<(), ParleyError>;
}
