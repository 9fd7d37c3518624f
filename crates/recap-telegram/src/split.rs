// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Length-bounded message splitting.
//!
//! Telegram rejects messages longer than its hard cap, so long
//! summaries are split paragraph-first, line-second, sentence-third,
//! with a character-boundary hard split as the last resort. Every
//! returned segment fits within the limit.

/// Telegram's message length cap.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Split `content` into segments of at most [`MAX_MESSAGE_LENGTH`] bytes.
pub fn split_message(content: &str) -> Vec<String> {
    split_with_limit(content, MAX_MESSAGE_LENGTH)
}

fn split_with_limit(content: &str, limit: usize) -> Vec<String> {
    if content.len() <= limit {
        return vec![content.to_string()];
    }

    // Prefer paragraph boundaries; fall back to single lines when the
    // text has no blank-line structure.
    let (parts, sep): (Vec<&str>, &str) = if content.contains("\n\n") {
        (content.split("\n\n").collect(), "\n\n")
    } else {
        (content.split('\n').collect(), "\n")
    };

    let mut messages = Vec::new();
    let mut current = String::new();

    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            part.len()
        } else {
            current.len() + sep.len() + part.len()
        };
        if needed <= limit {
            if !current.is_empty() {
                current.push_str(sep);
            }
            current.push_str(part);
            continue;
        }

        if !current.is_empty() {
            messages.push(std::mem::take(&mut current));
        }

        if part.len() <= limit {
            current = part.to_string();
        } else {
            // A single part exceeds the limit: sentence fallback, keeping
            // the trailing piece open so later parts can pack onto it.
            let mut pieces = split_oversized(part, limit);
            if let Some(last) = pieces.pop() {
                messages.extend(pieces);
                current = last;
            }
        }
    }

    if !current.is_empty() {
        messages.push(current);
    }
    messages
}

/// Split a single oversized block on sentence ends, hard-splitting any
/// sentence that alone exceeds the limit.
fn split_oversized(text: &str, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for sentence in text.split_inclusive(['。', '.']) {
        if !current.is_empty() && current.len() + sentence.len() > limit {
            out.push(std::mem::take(&mut current));
        }

        if sentence.len() > limit {
            let mut rest = sentence;
            while rest.len() > limit {
                let mut cut = limit;
                while !rest.is_char_boundary(cut) {
                    cut -= 1;
                }
                out.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
            current.push_str(rest);
        } else {
            current.push_str(sentence);
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}
