// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the recap service.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed
//! query operations for captured messages, summarization tasks, and
//! daily-run progress markers.

pub mod database;
pub mod migrations;
pub mod models;
pub mod provider;
pub mod queries;

pub use database::Database;
pub use models::*;
pub use provider::MessageStore;
