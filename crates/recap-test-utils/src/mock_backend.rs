// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted [`TopicSummarizer`] double.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use recap_core::{ChatMessage, RecapError, SummaryResult, TopicSummarizer};

/// A summarizer that replays scripted results and counts calls.
///
/// Each call pops the next scripted entry; an exhausted script fails
/// the call, which surfaces configuration mistakes in tests instead of
/// silently looping.
#[derive(Default)]
pub struct MockBackend {
    script: Mutex<VecDeque<Result<SummaryResult, String>>>,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that answers every call with clones of `result`.
    pub fn with_fixed(result: SummaryResult) -> Self {
        let backend = Self::new();
        backend.push_ok(result);
        backend
    }

    /// Queue a successful response.
    pub fn push_ok(&self, result: SummaryResult) {
        self.script.lock().unwrap().push_back(Ok(result));
    }

    /// Queue a failing response with the given provider error message.
    pub fn push_err(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Number of summarize calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopicSummarizer for MockBackend {
    async fn summarize_chat(
        &self,
        _messages: &[ChatMessage],
    ) -> Result<SummaryResult, RecapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        // A single-entry script acts as a fixed responder.
        let entry = if script.len() == 1 {
            script.front().cloned()
        } else {
            script.pop_front()
        };
        match entry {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(RecapError::Provider {
                message,
                source: None,
            }),
            None => Err(RecapError::Provider {
                message: "mock backend script exhausted".to_string(),
                source: None,
            }),
        }
    }
}
