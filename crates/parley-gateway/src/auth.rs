// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller identification and the register/login routes.
//!
//! Chat routes identify the caller by the `X-User-ID` header; binding it to
//! a session is left to whatever sits in front of the gateway.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use parley_auth::Account;
use parley_core::UserId;
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Header carrying the caller's numeric user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, taken from `X-User-ID`.
///
/// Rejects with 401 when the header is missing or not a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub UserId);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("missing X-User-ID header"))?;
        value
            .to_str()
            .ok()
            .and_then(|v| v.parse::<UserId>().ok())
            .map(CallerId)
            .ok_or_else(|| ApiError::unauthorized("invalid X-User-ID header"))
    }
}

/// Request body for register and login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<GatewayState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Account>, ApiError> {
    let Json(creds) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let account = state.auth.register(&creds.email, &creds.password).await?;
    Ok(Json(account))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<GatewayState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Account>, ApiError> {
    let Json(creds) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let account = state.auth.login(&creds.email, &creds.password).await?;
    Ok(Json(account))
}
