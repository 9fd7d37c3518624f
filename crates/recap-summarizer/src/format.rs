// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of a summary as platform-safe HTML.
//!
//! The delivered medium accepts `<b>` and `<a href>` entities only;
//! every user-sourced string (titles, sender names, descriptions, and
//! anything placed inside an href) is escaped unconditionally.

use recap_core::SummaryResult;

/// Supergroup chat ids are encoded as `-(1_000_000_000_000 + channel_id)`.
const SUPERGROUP_OFFSET: i64 = 1_000_000_000_000;

/// Escape the five HTML metacharacters. `&` must be replaced first.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Deep link to a message, or `None` when the chat id is not
/// supergroup-shaped (a broken URL is worse than no link).
fn message_link(chat_id: i64, message_id: i64) -> Option<String> {
    if chat_id < -SUPERGROUP_OFFSET {
        let channel_id = -chat_id - SUPERGROUP_OFFSET;
        Some(format!("https://t.me/c/{channel_id}/{message_id}"))
    } else {
        None
    }
}

/// Render a summary for display.
///
/// Returns an empty string when there are no topics, which callers
/// treat as "nothing to deliver".
pub fn format_summary(
    result: &SummaryResult,
    chat_id: i64,
    start_date: &str,
    end_date: &str,
) -> String {
    if result.topics.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str("📊 <b>Group Summary</b>\n");
    out.push_str(&format!("📅 {start_date} to {end_date} (UTC)\n"));

    for (i, topic) in result.topics.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{}. {}\n", i + 1, escape_html(&topic.title)));
        for item in &topic.items {
            out.push_str(&format!(
                "- <b>{}</b> {}",
                escape_html(&item.sender_name),
                escape_html(&item.description)
            ));
            for &message_id in &item.message_ids {
                if let Some(link) = message_link(chat_id, message_id) {
                    out.push_str(&format!(" [<a href=\"{}\">link</a>]", escape_html(&link)));
                }
            }
            out.push('\n');
        }
    }

    out
}
