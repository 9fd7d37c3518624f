// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam over the LLM summarization backend.

use async_trait::async_trait;

use crate::error::RecapError;
use crate::types::{ChatMessage, SummaryResult};

/// Produces a canonical topic-grouped summary of a message sequence.
///
/// Implementations own chunking and merging internally; callers hand in
/// the full ordered transcript and get back a single [`SummaryResult`].
/// An empty input must yield an empty result, not an error.
#[async_trait]
pub trait TopicSummarizer: Send + Sync {
    async fn summarize_chat(
        &self,
        messages: &[ChatMessage],
    ) -> Result<SummaryResult, RecapError>;
}
