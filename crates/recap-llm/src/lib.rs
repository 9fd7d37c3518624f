// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM summarization pipeline for recap.
//!
//! Converts an arbitrary-length transcript into a canonical
//! topic-grouped [`recap_core::SummaryResult`]: a heuristic token
//! estimator sizes chunks, the chunker splits the transcript without
//! loss or reordering, the client drives an OpenAI-compatible
//! chat-completions endpoint, and the merger folds per-chunk partials
//! into the accumulated result.

pub mod chunk;
pub mod client;
pub mod merge;
pub mod tokens;
pub mod types;

pub use client::LlmClient;
