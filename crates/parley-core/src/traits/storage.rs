// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits: backend lifecycle, the per-user transcript log, and users.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Role, Turn, User, UserId};

/// Adapter for storage and persistence backends.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, pragmas).
    async fn initialize(&self) -> Result<(), ParleyError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ParleyError>;
}

/// Durable append-only log of turns, one logical transcript per user.
///
/// Implementations guarantee read-your-writes: a turn appended for a user is
/// committed and visible to [`load_transcript`](Self::load_transcript)
/// before [`append_turn`](Self::append_turn) returns. No ordering is
/// promised across different users.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Appends a turn and returns it with its storage-assigned id and timestamp.
    async fn append_turn(
        &self,
        user_id: UserId,
        role: Role,
        content: &str,
    ) -> Result<Turn, ParleyError>;

    /// Loads every turn of the user's transcript, ordered by
    /// `(created_at, id)`. A user without turns yields an empty vector.
    async fn load_transcript(&self, user_id: UserId) -> Result<Vec<Turn>, ParleyError>;
}

/// Persistence for registered users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user with an already-normalized email.
    ///
    /// Returns [`ParleyError::DuplicateEmail`] when the email is taken.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, ParleyError>;

    /// Looks up a user by normalized email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ParleyError>;
}
