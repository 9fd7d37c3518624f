// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam over the persisted message store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RecapError;
use crate::types::ChatMessage;

/// Read access to captured chat messages within a half-open time window.
#[async_trait]
pub trait MessageProvider: Send + Sync {
    /// Messages for `chat_id` with `sent_at` in `[start, end)`, ordered
    /// by `sent_at` ascending.
    async fn list_messages_in(
        &self,
        chat_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ChatMessage>, RecapError>;
}
