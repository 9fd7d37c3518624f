// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the scheduler and its collaborators.
//!
//! Each seam is deliberately a single-operation trait so tests can
//! substitute scripted fakes for the LLM backend, the message store,
//! and the notifier transport.

mod messages;
mod notify;
mod summarize;

pub use messages::MessageProvider;
pub use notify::Notifier;
pub use summarize::TopicSummarizer;
