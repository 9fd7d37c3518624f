// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram delivery adapter for recap summaries.
//!
//! Implements the [`recap_core::Notifier`] seam over the Telegram Bot
//! API via teloxide: rendered HTML summaries are split into
//! length-bounded segments and sent according to the configured
//! delivery mode.

pub mod notifier;
pub mod split;

pub use notifier::TelegramNotifier;
pub use split::{split_message, MAX_MESSAGE_LENGTH};
