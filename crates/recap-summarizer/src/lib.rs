// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Window summarization orchestration and display formatting.
//!
//! [`Summarizer`] glues the message store to the LLM backend through
//! the `recap-core` trait seams; [`format`] renders the resulting topic
//! groups as platform-safe HTML with per-message deep links.

pub mod format;
pub mod summarizer;

pub use format::format_summary;
pub use summarizer::Summarizer;
