// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code-level topic merging.
//!
//! During chunked summarization the model is instructed to return the
//! entire updated topic set, but its compliance is treated as a hint:
//! this merge is the authoritative tiebreaker. Later descriptions win
//! (the later chunk saw more context); message-id evidence is never
//! lost.

use std::collections::HashSet;

use recap_core::{SummaryResult, TopicItem, TopicSubItem};

/// Merge `partial` into `accumulated`, returning an owned result.
///
/// Topics match by identical `title`; matched topics merge their items,
/// unmatched ones append at the end. Topics present only in
/// `accumulated` are preserved in place.
pub fn merge_topics(accumulated: &SummaryResult, partial: &SummaryResult) -> SummaryResult {
    if accumulated.topics.is_empty() {
        return partial.clone();
    }

    let mut merged = accumulated.clone();

    for new_topic in &partial.topics {
        match merged.topics.iter_mut().find(|t| t.title == new_topic.title) {
            Some(existing) => *existing = merge_topic_items(existing, new_topic),
            None => merged.topics.push(new_topic.clone()),
        }
    }

    merged
}

/// Merge the items of two same-titled topics, keyed by `sender_name`.
///
/// A matched sender keeps its position, takes the newer description,
/// and unions `message_ids` in first-seen order (prior ids first).
fn merge_topic_items(old: &TopicItem, new: &TopicItem) -> TopicItem {
    let mut items = old.items.clone();

    for new_item in &new.items {
        match items.iter_mut().find(|i| i.sender_name == new_item.sender_name) {
            Some(existing) => {
                *existing = TopicSubItem {
                    sender_name: new_item.sender_name.clone(),
                    description: new_item.description.clone(),
                    message_ids: merge_message_ids(&existing.message_ids, &new_item.message_ids),
                };
            }
            None => items.push(new_item.clone()),
        }
    }

    TopicItem {
        title: new.title.clone(),
        items,
    }
}

/// Union two message-id sequences, deduplicated, `a`'s order first.
fn merge_message_ids(a: &[i64], b: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(a.len() + b.len());
    for &id in a.iter().chain(b.iter()) {
        if seen.insert(id) {
            merged.push(id);
        }
    }
    merged
}

/// Render the accumulated topics as the "previous topics" context block
/// for the next chunk's prompt.
pub fn format_topics_for_context(result: &SummaryResult) -> String {
    let mut out = String::new();
    for (i, topic) in result.topics.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, topic.title));
        for item in &topic.items {
            let ids = item
                .message_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            out.push_str(&format!(
                "   - {}: {} (msg:{})\n",
                item.sender_name, item.description, ids
            ));
        }
    }
    out
}
