// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic token estimation for chunk sizing.
//!
//! This does not have to match any particular tokenizer: it only sizes
//! chunks, and the downstream call carries its own `max_tokens` cap.
//! The provider's context-window rejection is the secondary guard.

/// Approximate the token length of a text fragment.
///
/// CJK ideographs count ~1.5 tokens each and whitespace-split words
/// ~1.3 each; the result is floored at `len_bytes / 4` so unknown
/// scripts are never catastrophically underestimated.
pub fn estimate_tokens(text: &str) -> usize {
    let cjk_chars = text
        .chars()
        .filter(|&c| ('\u{4e00}'..='\u{9fff}').contains(&c))
        .count();
    let words = text.split_whitespace().count();

    let estimate = (cjk_chars as f64 * 1.5 + words as f64 * 1.3) as usize;
    estimate.max(text.len() / 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn latin_words_weigh_about_1_3() {
        // 10 words -> 13 tokens.
        let text = "the quick brown fox jumps over the lazy dog again";
        assert_eq!(estimate_tokens(text), 13);
    }

    #[test]
    fn cjk_chars_weigh_about_1_5() {
        // 4 ideographs, one whitespace-joined "word": 4*1.5 + 1*1.3 = 7.
        let text = "你好世界";
        assert_eq!(estimate_tokens(text), 7);
    }

    #[test]
    fn byte_floor_catches_unknown_scripts() {
        // A long run with no whitespace and no CJK: the word estimate is
        // a single word, so the len/4 floor must win.
        let text = "a".repeat(400);
        assert_eq!(estimate_tokens(&text), 100);
    }

    #[test]
    fn monotone_in_length() {
        let mut prev = 0;
        let mut text = String::new();
        for i in 0..50 {
            text.push_str(&format!("word{i} "));
            let estimate = estimate_tokens(&text);
            assert!(estimate >= prev, "estimate shrank at iteration {i}");
            prev = estimate;
        }
    }
}
