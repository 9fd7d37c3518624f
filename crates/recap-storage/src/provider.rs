// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`MessageProvider`] implementation backed by the SQLite store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recap_core::{ChatMessage, MessageProvider, RecapError};

use crate::database::Database;
use crate::queries::messages;

/// Adapts the messages table to the summarizer's read seam.
#[derive(Clone)]
pub struct MessageStore {
    db: Database,
}

impl MessageStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageProvider for MessageStore {
    async fn list_messages_in(
        &self,
        chat_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ChatMessage>, RecapError> {
        let records = messages::list_messages_in(&self.db, chat_id, start, end).await?;
        Ok(records
            .into_iter()
            .map(|m| ChatMessage {
                message_id: m.message_id,
                sender_id: m.sender_id,
                sender_name: m.sender_name,
                text: m.text,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewMessage;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[tokio::test]
    async fn maps_rows_to_chat_messages_in_order() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let base = Utc.with_ymd_and_hms(2025, 2, 10, 9, 0, 0).unwrap();
        for (i, name) in [(0, "B"), (1, "A")] {
            messages::insert_message(
                &db,
                &NewMessage {
                    message_id: 100 + i,
                    chat_id: 1,
                    sender_id: i,
                    sender_name: name.to_string(),
                    sender_username: None,
                    text: format!("hello {i}"),
                    sent_at: base + chrono::Duration::minutes(i),
                },
            )
            .await
            .unwrap();
        }

        let store = MessageStore::new(db.clone());
        let msgs = store
            .list_messages_in(
                1,
                Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 2, 11, 0, 0, 0).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].message_id, 100);
        assert_eq!(msgs[0].sender_name, "B");
        assert_eq!(msgs[1].message_id, 101);
        assert_eq!(msgs[1].sender_name, "A");

        db.close().await.unwrap();
    }
}
