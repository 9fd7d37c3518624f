// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording [`Notifier`] double with scriptable failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use recap_core::{Notifier, RecapError};

/// A notifier that records every delivery and optionally fails the
/// first `fail_first` calls (use [`MockNotifier::always_failing`] for a
/// permanently broken transport).
#[derive(Default)]
pub struct MockNotifier {
    fail_first: usize,
    attempts: AtomicUsize,
    delivered: Mutex<Vec<(i64, String)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `n` notify calls, then succeed.
    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_first: n,
            ..Self::default()
        }
    }

    /// Fail every notify call.
    pub fn always_failing() -> Self {
        Self::failing_first(usize::MAX)
    }

    /// Total notify calls observed, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Successfully delivered `(chat_id, content)` pairs, in order.
    pub fn delivered(&self) -> Vec<(i64, String)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, content: &str, chat_id: i64) -> Result<(), RecapError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(RecapError::Notify {
                message: "scripted delivery failure".to_string(),
                source: None,
            });
        }
        self.delivered
            .lock()
            .unwrap()
            .push((chat_id, content.to_string()));
        Ok(())
    }
}
