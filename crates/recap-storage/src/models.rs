// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for storage entities.
//!
//! Statuses are stored as lowercase TEXT and round-trip through the
//! strum `Display`/`EnumString` derives.

use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

/// Lifecycle of a per-(chat, window) summarization task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Lifecycle of a whole daily run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// A captured chat message row.
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: i64,
    /// Platform message identifier, unique within `chat_id`.
    pub message_id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub sender_username: Option<String>,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new captured message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub sender_username: Option<String>,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// A per-(chat, window) summarization task row.
///
/// `summary_content` is non-empty only between "summary produced" and
/// "delivery acknowledged"; its presence marks a delivery-only retry
/// point for recovery.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub id: i64,
    pub chat_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: TaskStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub summary_content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Whether a rendered summary is awaiting delivery.
    pub fn has_pending_summary(&self) -> bool {
        self.summary_content
            .as_deref()
            .is_some_and(|s| !s.is_empty())
    }
}

/// A daily-run progress row.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: RunStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
