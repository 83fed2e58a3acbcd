// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript operations on the `chat_turns` table.

use parley_core::{ParleyError, Role, Turn, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Appends one turn and returns it with its assigned id and timestamp.
///
/// The timestamp never goes backwards within a user's transcript: if the
/// wall clock is behind the newest stored turn, that turn's timestamp is
/// reused and the id breaks the tie.
pub async fn append_turn(
    db: &Database,
    user_id: UserId,
    role: Role,
    content: &str,
) -> Result<Turn, ParleyError> {
    let content = content.to_string();
    let now = super::now_timestamp();
    db.connection()
        .call(move |conn| -> Result<Turn, rusqlite::Error> {
            let tx = conn.transaction()?;
            let newest: Option<String> = tx
                .query_row(
                    "SELECT MAX(created_at) FROM chat_turns WHERE user_id = ?1",
                    params![user_id.get()],
                    |row| row.get(0),
                )
                .optional()?
                .flatten();
            let created_at = match newest {
                Some(newest) if newest > now => newest,
                _ => now,
            };

            tx.execute(
                "INSERT INTO chat_turns (user_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id.get(), role.as_str(), content, created_at],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;

            Ok(Turn {
                id,
                user_id,
                role,
                content,
                created_at,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Loads a user's whole transcript ordered by `(created_at, id)`.
pub async fn load_transcript(db: &Database, user_id: UserId) -> Result<Vec<Turn>, ParleyError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Turn>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, role, content, created_at
                 FROM chat_turns
                 WHERE user_id = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![user_id.get()], |row| {
                let role: String = row.get(1)?;
                Ok(Turn {
                    id: row.get(0)?,
                    user_id,
                    role: Role::parse_lenient(&role),
                    content: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
