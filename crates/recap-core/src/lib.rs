// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the recap chat summarization service.
//!
//! This crate provides the error type, the topic-grouped summary domain
//! model, and the narrow trait seams (summarizer, message source,
//! notifier) that let the scheduler be tested against fakes.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RecapError;
pub use traits::{MessageProvider, Notifier, TopicSummarizer};
pub use types::{ChatMessage, SummaryResult, TopicItem, TopicSubItem};
