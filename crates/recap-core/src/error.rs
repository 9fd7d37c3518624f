// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the recap service.

use thiserror::Error;

/// The primary error type used across all recap crates.
#[derive(Debug, Error)]
pub enum RecapError {
    /// Configuration errors (invalid YAML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors (API failure, empty response, unparseable reply).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Notifier errors (send failure, partial delivery).
    #[error("notify error: {message}")]
    Notify {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation was interrupted by shutdown. Non-terminal: the owning
    /// task stays `processing` and is re-picked by recovery on next start.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecapError {
    /// Whether this error is the non-terminal shutdown signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RecapError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_variants_construct() {
        let _config = RecapError::Config("test".into());
        let _storage = RecapError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = RecapError::Provider {
            message: "test".into(),
            source: None,
        };
        let _notify = RecapError::Notify {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _cancelled = RecapError::Cancelled;
        let _internal = RecapError::Internal("test".into());
    }

    #[test]
    fn only_cancelled_is_cancelled() {
        assert!(RecapError::Cancelled.is_cancelled());
        assert!(!RecapError::Config("x".into()).is_cancelled());
        assert!(!RecapError::Provider {
            message: "x".into(),
            source: None
        }
        .is_cancelled());
    }
}
