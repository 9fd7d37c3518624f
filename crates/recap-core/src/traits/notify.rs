// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam over the notification transport.

use async_trait::async_trait;

use crate::error::RecapError;

/// Delivers a rendered summary to its recipients.
///
/// Delivery is at-least-once: the scheduler may call `notify` again for
/// the same content after a crash, and recipients must tolerate
/// duplicate segments.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `content` for the chat it was generated from. `chat_id`
    /// selects the target in group mode; private mode ignores it.
    async fn notify(&self, content: &str, chat_id: i64) -> Result<(), RecapError>;
}
