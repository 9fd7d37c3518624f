// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token-bounded splitting of an ordered message sequence.

use recap_core::ChatMessage;

use crate::tokens::estimate_tokens;

/// The canonical one-line rendering fed to the model.
pub fn message_line(msg: &ChatMessage) -> String {
    format!("[{}|{}] {}", msg.sender_name, msg.message_id, msg.text)
}

/// Join a message sequence into the prompt transcript, one line each.
pub fn messages_to_prompt_text(msgs: &[ChatMessage]) -> String {
    msgs.iter()
        .map(message_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `msgs` into chunks whose rendered token estimate stays within
/// `max_tokens_per_chunk`.
///
/// Greedy fill, preserving order: every input message lands in exactly
/// one chunk. A single message that alone exceeds the budget becomes a
/// singleton chunk rather than being rejected.
pub fn split_messages_into_chunks(
    msgs: &[ChatMessage],
    max_tokens_per_chunk: usize,
) -> Vec<Vec<ChatMessage>> {
    let mut chunks = Vec::new();
    let mut current: Vec<ChatMessage> = Vec::new();
    let mut current_tokens = 0;

    for msg in msgs {
        let tokens = estimate_tokens(&message_line(msg));
        if current_tokens + tokens > max_tokens_per_chunk && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
        current.push(msg.clone());
        current_tokens += tokens;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
