// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable summarization scheduling for recap.
//!
//! The [`Scheduler`] drives cron-triggered daily runs over the task and
//! run stores, retries at two granularities (whole summary generation
//! and delivery-only), recovers unfinished work on startup, and sweeps
//! expired messages after every run.

pub mod scheduler;

pub use scheduler::Scheduler;
