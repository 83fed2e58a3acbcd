// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user turn serialization.
//!
//! Two turns of the same user never overlap: the second waits until the
//! first releases its [`UserTurnGuard`]. Turns of different users never
//! contend. Map entries exist only while someone holds or waits for them.

use std::sync::Arc;

use dashmap::DashMap;
use parley_core::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-user turn locks. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct UserLocks {
    locks: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until `user_id` has no turn in flight, then claims it.
    pub async fn acquire(&self, user_id: UserId) -> UserTurnGuard {
        let lock = Arc::clone(self.locks.entry(user_id).or_default().value());
        let guard = lock.lock_owned().await;
        UserTurnGuard {
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
            user_id,
        }
    }

    /// Number of users currently holding or waiting for a lock.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive claim on one user's turn slot. Released on drop.
#[derive(Debug)]
pub struct UserTurnGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
    user_id: UserId,
}

impl Drop for UserTurnGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody is waiting.
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn user(id: i64) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn entry_is_removed_after_release() {
        let locks = UserLocks::new();
        let guard = locks.acquire(user(1)).await;
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn same_user_waits_for_previous_turn() {
        let locks = UserLocks::new();
        let first = locks.acquire(user(1)).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _second = locks.acquire(user(1)).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_users_do_not_contend() {
        let locks = UserLocks::new();
        let _a = locks.acquire(user(1)).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(user(2))).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
