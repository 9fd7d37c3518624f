// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Captured-message operations: the ingest surface and the window
//! queries consumed by the scheduler.

use chrono::{DateTime, Utc};
use recap_core::RecapError;
use rusqlite::{params, Row};

use crate::database::Database;
use crate::models::{MessageRecord, NewMessage};

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<MessageRecord> {
    Ok(MessageRecord {
        id: row.get(0)?,
        message_id: row.get(1)?,
        chat_id: row.get(2)?,
        sender_id: row.get(3)?,
        sender_name: row.get(4)?,
        sender_username: row.get(5)?,
        text: row.get(6)?,
        sent_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const MESSAGE_COLUMNS: &str = "id, message_id, chat_id, sender_id, sender_name, \
                               sender_username, text, sent_at, created_at";

/// Insert a captured message.
///
/// Duplicate `(chat_id, message_id)` pairs are ignored; returns whether
/// a row was actually written.
pub async fn insert_message(db: &Database, msg: &NewMessage) -> Result<bool, RecapError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO messages (message_id, chat_id, sender_id, sender_name,
                                       sender_username, text, sent_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (chat_id, message_id) DO NOTHING",
                params![
                    msg.message_id,
                    msg.chat_id,
                    msg.sender_id,
                    msg.sender_name,
                    msg.sender_username,
                    msg.text,
                    msg.sent_at,
                ],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Distinct chat ids with at least one message with `sent_at` in
/// `[start, end)`.
pub async fn list_chat_ids_in(
    db: &Database,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<i64>, RecapError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT chat_id FROM messages
                 WHERE sent_at >= ?1 AND sent_at < ?2
                 ORDER BY chat_id",
            )?;
            let rows = stmt.query_map(params![start, end], |row| row.get(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row?);
            }
            Ok(ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Messages for `chat_id` with `sent_at` in `[start, end)`, ordered by
/// `sent_at` ascending.
pub async fn list_messages_in(
    db: &Database,
    chat_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<MessageRecord>, RecapError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE chat_id = ?1 AND sent_at >= ?2 AND sent_at < ?3
                 ORDER BY sent_at, id"
            ))?;
            let rows = stmt.query_map(params![chat_id, start, end], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete all messages with `sent_at` before `cutoff`. Returns the
/// number of rows deleted.
pub async fn delete_messages_before(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<usize, RecapError> {
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM messages WHERE sent_at < ?1",
                params![cutoff],
            )?;
            Ok(deleted)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, day, hour, 0, 0).unwrap()
    }

    fn make_message(chat_id: i64, message_id: i64, sent_at: DateTime<Utc>) -> NewMessage {
        NewMessage {
            message_id,
            chat_id,
            sender_id: 7,
            sender_name: "alice".into(),
            sender_username: Some("alice_u".into()),
            text: format!("message {message_id}"),
            sent_at,
        }
    }

    #[tokio::test]
    async fn insert_and_list_round_trips() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_message(1, 100, ts(10, 9)))
            .await
            .unwrap();
        insert_message(&db, &make_message(1, 101, ts(10, 10)))
            .await
            .unwrap();

        let messages = list_messages_in(&db, 1, ts(10, 0), ts(11, 0)).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message_id, 100);
        assert_eq!(messages[1].message_id, 101);
        assert_eq!(messages[0].sender_username.as_deref(), Some("alice_u"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_insert_is_noop() {
        let (db, _dir) = setup_db().await;

        assert!(insert_message(&db, &make_message(1, 100, ts(10, 9)))
            .await
            .unwrap());
        assert!(!insert_message(&db, &make_message(1, 100, ts(10, 9)))
            .await
            .unwrap());
        // Same message id in another chat is a distinct message.
        assert!(insert_message(&db, &make_message(2, 100, ts(10, 9)))
            .await
            .unwrap());

        let messages = list_messages_in(&db, 1, ts(10, 0), ts(11, 0)).await.unwrap();
        assert_eq!(messages.len(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn window_is_half_open() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_message(1, 1, ts(10, 0))).await.unwrap();
        insert_message(&db, &make_message(1, 2, ts(11, 0))).await.unwrap();

        // [day10, day11) includes the start boundary, excludes the end.
        let messages = list_messages_in(&db, 1, ts(10, 0), ts(11, 0)).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_id, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn chat_ids_are_distinct() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_message(5, 1, ts(10, 1))).await.unwrap();
        insert_message(&db, &make_message(5, 2, ts(10, 2))).await.unwrap();
        insert_message(&db, &make_message(3, 1, ts(10, 3))).await.unwrap();
        insert_message(&db, &make_message(9, 1, ts(12, 1))).await.unwrap();

        let ids = list_chat_ids_in(&db, ts(10, 0), ts(11, 0)).await.unwrap();
        assert_eq!(ids, vec![3, 5]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_before_respects_cutoff() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_message(1, 1, ts(8, 0))).await.unwrap();
        insert_message(&db, &make_message(1, 2, ts(9, 23))).await.unwrap();
        insert_message(&db, &make_message(1, 3, ts(10, 0))).await.unwrap();

        let deleted = delete_messages_before(&db, ts(10, 0)).await.unwrap();
        assert_eq!(deleted, 2);

        // The message exactly at the cutoff survives.
        let remaining = list_messages_in(&db, 1, ts(1, 0), ts(28, 0)).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message_id, 3);
        db.close().await.unwrap();
    }
}
