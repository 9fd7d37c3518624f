// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-window summarization over the message-store and LLM seams.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use recap_core::{MessageProvider, RecapError, SummaryResult, TopicSummarizer};
use tracing::info;

/// Generates a topic-grouped summary for one chat over one time window.
///
/// Both collaborators sit behind single-method traits so tests can
/// script them.
pub struct Summarizer {
    backend: Arc<dyn TopicSummarizer>,
    messages: Arc<dyn MessageProvider>,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn TopicSummarizer>, messages: Arc<dyn MessageProvider>) -> Self {
        Self { backend, messages }
    }

    /// Summarize `chat_id`'s messages with `sent_at` in `[start, end)`.
    ///
    /// Returns `Ok(None)` when the window holds no messages; that is a
    /// legitimate "nothing to say" outcome, not a failure.
    pub async fn summarize_range(
        &self,
        chat_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<SummaryResult>, RecapError> {
        let messages = self.messages.list_messages_in(chat_id, start, end).await?;

        if messages.is_empty() {
            info!(chat_id, "no messages in window, skipping summary");
            return Ok(None);
        }

        info!(chat_id, count = messages.len(), "summarizing window");
        let result = self.backend.summarize_chat(&messages).await?;
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use recap_core::{ChatMessage, TopicItem, TopicSubItem};
    use std::sync::Mutex;

    struct FixedMessages(Vec<ChatMessage>);

    #[async_trait]
    impl MessageProvider for FixedMessages {
        async fn list_messages_in(
            &self,
            _chat_id: i64,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<ChatMessage>, RecapError> {
            Ok(self.0.clone())
        }
    }

    struct RecordingBackend {
        calls: Mutex<usize>,
        result: SummaryResult,
    }

    #[async_trait]
    impl TopicSummarizer for RecordingBackend {
        async fn summarize_chat(
            &self,
            messages: &[ChatMessage],
        ) -> Result<SummaryResult, RecapError> {
            assert!(!messages.is_empty(), "backend must not see empty windows");
            *self.calls.lock().unwrap() += 1;
            Ok(self.result.clone())
        }
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 11, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn empty_window_skips_the_backend() {
        let backend = Arc::new(RecordingBackend {
            calls: Mutex::new(0),
            result: SummaryResult::default(),
        });
        let summarizer = Summarizer::new(backend.clone(), Arc::new(FixedMessages(vec![])));

        let (start, end) = window();
        let result = summarizer.summarize_range(1, start, end).await.unwrap();
        assert!(result.is_none());
        assert_eq!(*backend.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn non_empty_window_returns_backend_result() {
        let expected = SummaryResult {
            topics: vec![TopicItem {
                title: "Greetings".into(),
                items: vec![TopicSubItem {
                    sender_name: "A".into(),
                    description: "said hi".into(),
                    message_ids: vec![100],
                }],
            }],
        };
        let backend = Arc::new(RecordingBackend {
            calls: Mutex::new(0),
            result: expected.clone(),
        });
        let messages = vec![ChatMessage {
            message_id: 100,
            sender_id: 1,
            sender_name: "A".into(),
            text: "hi".into(),
        }];
        let summarizer = Summarizer::new(backend.clone(), Arc::new(FixedMessages(messages)));

        let (start, end) = window();
        let result = summarizer.summarize_range(1, start, end).await.unwrap();
        assert_eq!(result, Some(expected));
        assert_eq!(*backend.calls.lock().unwrap(), 1);
    }
}
