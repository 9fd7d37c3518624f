// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-database fixtures and seeding helpers.

use chrono::{DateTime, Utc};
use recap_config::SummaryConfig;
use recap_core::{SummaryResult, TopicItem, TopicSubItem};
use recap_storage::queries::messages;
use recap_storage::{Database, NewMessage};
use tempfile::TempDir;

/// Open a fresh migrated database in a temp directory.
///
/// The returned [`TempDir`] must be kept alive for the database's
/// lifetime.
pub async fn temp_database() -> (Database, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let db_path = dir.path().join("recap-test.db");
    let db = Database::open(db_path.to_str().expect("temp path is valid utf-8"))
        .await
        .expect("failed to open temp database");
    (db, dir)
}

/// A summary config with a short, test-friendly retry policy.
pub fn test_summary_config() -> SummaryConfig {
    SummaryConfig {
        cron: "0 0 * * *".to_string(),
        range_days: 1,
        retention_days: 7,
        retry_times: 1,
        retry_interval: 1,
        ..SummaryConfig::default()
    }
}

/// Insert one captured message.
pub async fn seed_message(
    db: &Database,
    chat_id: i64,
    message_id: i64,
    sender_id: i64,
    sender_name: &str,
    text: &str,
    sent_at: DateTime<Utc>,
) {
    messages::insert_message(
        db,
        &NewMessage {
            message_id,
            chat_id,
            sender_id,
            sender_name: sender_name.to_string(),
            sender_username: None,
            text: text.to_string(),
            sent_at,
        },
    )
    .await
    .expect("failed to seed message");
}

/// A one-topic summary with a single contributor, for scripting mocks.
pub fn simple_summary(title: &str, sender: &str, description: &str, ids: &[i64]) -> SummaryResult {
    SummaryResult {
        topics: vec![TopicItem {
            title: title.to_string(),
            items: vec![TopicSubItem {
                sender_name: sender.to_string(),
                description: description.to_string(),
                message_ids: ids.to_vec(),
            }],
        }],
    }
}
