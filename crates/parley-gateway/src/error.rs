// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of [`ParleyError`] onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parley_core::ParleyError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// An error on its way to the client: a status and a public message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

/// HTTP status for each error kind.
pub fn status_for(err: &ParleyError) -> StatusCode {
    match err {
        ParleyError::Validation(_) | ParleyError::DuplicateEmail => StatusCode::BAD_REQUEST,
        ParleyError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        ParleyError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        ParleyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        // The client is gone; nobody reads this status.
        ParleyError::Delivery { .. } => StatusCode::BAD_REQUEST,
        ParleyError::Storage { .. }
        | ParleyError::ReplyNotRecorded { .. }
        | ParleyError::Config(_)
        | ParleyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message shown to clients. Server-side details stay in the logs.
pub fn public_message(err: &ParleyError) -> String {
    match err {
        ParleyError::Validation(message) => message.clone(),
        ParleyError::Storage { .. } => "storage unavailable".to_string(),
        ParleyError::ReplyNotRecorded { .. } => {
            "reply delivered but could not be saved".to_string()
        }
        ParleyError::Upstream { .. } => "model provider error".to_string(),
        ParleyError::Config(_) | ParleyError::Internal(_) => "internal error".to_string(),
        other => other.to_string(),
    }
}

impl From<ParleyError> for ApiError {
    fn from(err: ParleyError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, status = status.as_u16(), "request failed");
        }
        Self::new(status, public_message(&err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (ParleyError::Validation("x".into()), 400),
            (ParleyError::DuplicateEmail, 400),
            (ParleyError::InvalidCredentials, 401),
            (ParleyError::storage("disk"), 500),
            (
                ParleyError::ReplyNotRecorded {
                    source: "disk".into(),
                },
                500,
            ),
            (ParleyError::Internal("x".into()), 500),
            (ParleyError::Config("x".into()), 500),
            (ParleyError::upstream("bad"), 502),
            (
                ParleyError::Timeout {
                    duration: Duration::from_secs(60),
                },
                504,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err).as_u16(), status, "{err:?}");
        }
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let err = ParleyError::storage("/var/lib/parley/parley.db is locked");
        let api: ApiError = err.into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("/var/lib"));
    }

    #[test]
    fn provider_error_body_is_not_exposed() {
        let err = ParleyError::upstream(
            "provider returned 401 Unauthorized: Invalid key sk-live-1234 for org acme",
        );
        let api: ApiError = err.into();
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api.message, "model provider error");
    }

    #[test]
    fn validation_message_passes_through() {
        let api: ApiError = ParleyError::Validation("message required".into()).into();
        assert_eq!(api.message, "message required");
    }
}
