// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types for topic-grouped chat summaries.
//!
//! The serde field names of [`SummaryResult`] and its children are the
//! wire schema the LLM is instructed to emit; they must not drift from
//! the system prompt in `recap-llm`.

use serde::{Deserialize, Serialize};

/// A single chat message as exposed to the summarization pipeline.
///
/// This is the in-memory subset of the persisted message row; the
/// storage layer maps rows into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Platform message identifier, unique within a chat.
    pub message_id: i64,
    /// Platform user identifier of the sender.
    pub sender_id: i64,
    /// Display name of the sender at the time the message was captured.
    pub sender_name: String,
    /// Message text content.
    pub text: String,
}

/// One sender's contribution to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSubItem {
    pub sender_name: String,
    pub description: String,
    #[serde(default)]
    pub message_ids: Vec<i64>,
}

/// A discussion topic with per-sender contributions.
///
/// Invariant: `sender_name` is unique across `items`; the merge in
/// `recap-llm` maintains this even when the model does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicItem {
    pub title: String,
    #[serde(default)]
    pub items: Vec<TopicSubItem>,
}

/// The canonical topic-grouped summary of a message window.
///
/// Invariant after merge: `title` is unique across `topics`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    #[serde(default)]
    pub topics: Vec<TopicItem>,
}

impl SummaryResult {
    /// Whether the summary carries no topics at all.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_result_deserializes_wire_schema() {
        let raw = r#"{
            "topics": [
                {
                    "title": "Greetings",
                    "items": [
                        {"sender_name": "A", "description": "said hi", "message_ids": [100, 102]},
                        {"sender_name": "B", "description": "responded", "message_ids": [101]}
                    ]
                }
            ]
        }"#;
        let result: SummaryResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.topics.len(), 1);
        assert_eq!(result.topics[0].title, "Greetings");
        assert_eq!(result.topics[0].items[0].message_ids, vec![100, 102]);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let result: SummaryResult = serde_json::from_str("{}").unwrap();
        assert!(result.is_empty());

        let topic: TopicItem = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        assert!(topic.items.is_empty());
    }

    #[test]
    fn summary_result_round_trips() {
        let result = SummaryResult {
            topics: vec![TopicItem {
                title: "t".into(),
                items: vec![TopicSubItem {
                    sender_name: "s".into(),
                    description: "d".into(),
                    message_ids: vec![1, 2],
                }],
            }],
        };
        let json = serde_json::to_string(&result).unwrap();
        let parsed: SummaryResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, parsed);
    }
}
