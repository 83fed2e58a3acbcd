// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration and login on top of a [`UserStore`].

use std::sync::Arc;
use std::time::Duration;

use parley_core::{ParleyError, UserId, UserStore};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::password::{self, HashCost};

/// Public view of an account, returned by both operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: UserId,
    pub email: String,
}

/// Email/password authentication.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    cost: HashCost,
    deadline: Duration,
    /// Verified against when the email is unknown, so both login failures
    /// cost one Argon2id run.
    decoy: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self {
            users,
            cost: HashCost::default(),
            deadline: Duration::from_secs(5),
            decoy: Arc::new(OnceCell::new()),
        }
    }

    /// Overrides the Argon2id cost used for new hashes.
    pub fn with_cost(mut self, cost: HashCost) -> Self {
        self.cost = cost;
        self.decoy = Arc::new(OnceCell::new());
        self
    }

    /// Bounds each register/login call.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Creates an account. Both fields are required; the email is stored
    /// normalized and must not already be taken.
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, ParleyError> {
        let (email, password) = require_credentials(email, password)?;
        self.bounded(async {
            let cost = self.cost;
            let hash = tokio::task::spawn_blocking(move || password::hash_password(&password, cost))
                .await
                .map_err(|e| ParleyError::Internal(format!("hashing task failed: {e}")))??;

            let user = self.users.create_user(&email, &hash).await?;
            info!(user_id = %user.id, "user registered");
            Ok(Account {
                id: user.id,
                email: user.email,
            })
        })
        .await
    }

    /// Verifies credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, ParleyError> {
        let (email, password) = require_credentials(email, password)?;
        self.bounded(async {
            let user = self.users.find_user_by_email(&email).await?;
            let phc = match &user {
                Some(user) => user.password_hash.clone(),
                None => self.decoy_hash().await?,
            };
            let matches = tokio::task::spawn_blocking(move || password::verify_password(&password, &phc))
                .await
                .map_err(|e| ParleyError::Internal(format!("verification task failed: {e}")))??;

            match user {
                Some(user) if matches => Ok(Account {
                    id: user.id,
                    email: user.email,
                }),
                Some(user) => {
                    debug!(user_id = %user.id, "login with wrong password");
                    Err(ParleyError::InvalidCredentials)
                }
                None => {
                    debug!("login for unknown email");
                    Err(ParleyError::InvalidCredentials)
                }
            }
        })
        .await
    }

    /// A hash of a random-salted empty password at the current cost.
    async fn decoy_hash(&self) -> Result<String, ParleyError> {
        let cost = self.cost;
        self.decoy
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || password::hash_password("", cost))
                    .await
                    .map_err(|e| ParleyError::Internal(format!("hashing task failed: {e}")))?
            })
            .await
            .cloned()
    }

    async fn bounded<T>(
        &self,
        work: impl Future<Output = Result<T, ParleyError>>,
    ) -> Result<T, ParleyError> {
        tokio::time::timeout(self.deadline, work)
            .await
            .map_err(|_| ParleyError::Timeout {
                duration: self.deadline,
            })?
    }
}

/// Trimmed, lowercased email.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require_credentials(email: &str, password: &str) -> Result<(String, String), ParleyError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(ParleyError::Validation(
            "email and password required".to_string(),
        ));
    }
    Ok((email, password.to_string()))
}
