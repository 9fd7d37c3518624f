// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles and fixtures for recap integration tests.
//!
//! Provides scripted implementations of the `recap-core` trait seams
//! (LLM backend and notifier) plus a temp-SQLite harness with seeding
//! helpers, so scheduler behavior can be driven end to end without any
//! network.

pub mod harness;
pub mod mock_backend;
pub mod mock_notifier;

pub use harness::{seed_message, simple_summary, temp_database, test_summary_config};
pub use mock_backend::MockBackend;
pub use mock_notifier::MockNotifier;
