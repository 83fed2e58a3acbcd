// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email/password authentication for Parley.
//!
//! Emails are normalized (trimmed, lowercased) before storage and lookup.
//! Passwords are hashed with Argon2id into PHC strings.

pub mod password;
pub mod service;

pub use password::HashCost;
pub use service::{Account, AuthService, normalize_email};
