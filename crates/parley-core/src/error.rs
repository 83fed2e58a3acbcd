// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley chat backend.

use thiserror::Error;

/// The primary error type used across all Parley adapter traits and core operations.
///
/// Variants follow the failure taxonomy of a chat turn: caller mistakes
/// (`Validation`, `DuplicateEmail`, `InvalidCredentials`), persistence
/// failures (`Storage`, `ReplyNotRecorded`), delivery failures toward the
/// caller (`Delivery`) and failures of the upstream model (`Upstream`,
/// `Timeout`).
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Missing or malformed input that the caller can correct.
    #[error("validation error: {0}")]
    Validation(String),

    /// Registration attempted with an email that is already taken.
    #[error("email already taken")]
    DuplicateEmail,

    /// Login failed. Deliberately does not say whether the email exists.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Storage backend errors (connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The assistant reply was generated and delivered to the caller but
    /// could not be persisted. The transcript is missing this reply.
    #[error("assistant reply delivered but not recorded: {source}")]
    ReplyNotRecorded {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The caller's stream can no longer accept data (disconnect, cancellation).
    #[error("delivery error: {message}")]
    Delivery { message: String },

    /// Model provider errors (network, provider-side fault, context rejection).
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Configuration errors (invalid values, missing API key).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Wraps any error as a [`ParleyError::Storage`].
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Creates a [`ParleyError::Delivery`] with the given message.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Creates a [`ParleyError::Upstream`] without an underlying source.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            source: None,
        }
    }

    /// True for every persistence failure, including a reply that was
    /// delivered but not recorded.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::ReplyNotRecorded { .. })
    }

    /// True when the upstream model failed or ran out of time.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_not_recorded_counts_as_storage() {
        let err = ParleyError::ReplyNotRecorded {
            source: "disk full".into(),
        };
        assert!(err.is_storage());
        assert!(!err.is_upstream());
        assert!(err.to_string().contains("delivered but not recorded"));
    }

    #[test]
    fn timeout_counts_as_upstream() {
        let err = ParleyError::Timeout {
            duration: std::time::Duration::from_secs(60),
        };
        assert!(err.is_upstream());
        assert!(!err.is_storage());
    }

    #[test]
    fn helper_constructors() {
        assert!(matches!(
            ParleyError::storage("boom"),
            ParleyError::Storage { .. }
        ));
        assert_eq!(
            ParleyError::delivery("client gone").to_string(),
            "delivery error: client gone"
        );
        assert_eq!(
            ParleyError::upstream("bad gateway").to_string(),
            "upstream error: bad gateway"
        );
    }
}
