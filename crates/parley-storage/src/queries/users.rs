// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User account operations on the `users` table.

use parley_core::{ParleyError, User, UserId};
use rusqlite::{ErrorCode, OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Inserts a new user. A taken email yields [`ParleyError::DuplicateEmail`].
pub async fn create_user(
    db: &Database,
    email: &str,
    password_hash: &str,
) -> Result<User, ParleyError> {
    let owned_email = email.to_string();
    let owned_hash = password_hash.to_string();
    let created_at = super::now_timestamp();
    let id = db
        .connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO users (email, password_hash, created_at) VALUES (?1, ?2, ?3)",
                params![owned_email, owned_hash, created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == ErrorCode::ConstraintViolation
                    && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                ParleyError::DuplicateEmail
            }
            other => map_tr_err(other),
        })?;

    Ok(User {
        id: UserId::new(id)?,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
    })
}

/// Looks up a user by email (case-insensitive).
pub async fn find_user_by_email(db: &Database, email: &str) -> Result<Option<User>, ParleyError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<(i64, String, String)>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, email, password_hash FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?
        .map(|(id, email, password_hash)| {
            Ok(User {
                id: UserId::new(id)?,
                email,
                password_hash,
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_find() {
        let db = Database::open_in_memory().await.unwrap();
        let created = create_user(&db, "ada@example.com", "$argon2id$hash")
            .await
            .unwrap();
        assert!(created.id.get() > 0);

        let found = find_user_by_email(&db, "ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn lookup_ignores_case() {
        let db = Database::open_in_memory().await.unwrap();
        create_user(&db, "ada@example.com", "h").await.unwrap();
        let found = find_user_by_email(&db, "ADA@Example.com").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn unknown_email_is_none() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(
            find_user_by_email(&db, "nobody@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_reported_distinctly() {
        let db = Database::open_in_memory().await.unwrap();
        create_user(&db, "ada@example.com", "h1").await.unwrap();
        let err = create_user(&db, "Ada@Example.com", "h2").await.unwrap_err();
        assert!(matches!(err, ParleyError::DuplicateEmail), "got {err:?}");
    }
}
