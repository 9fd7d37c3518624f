// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the recap summarization service.
//!
//! Loading is layered through Figment (compiled defaults, a YAML file
//! selected on the command line, `RECAP_*` environment overrides),
//! followed by a semantic validation pass that collects every problem
//! before reporting. Figment errors are bridged into miette diagnostics
//! with "did you mean?" key suggestions.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod schedule;
pub mod validation;

pub use diagnostic::{figment_to_config_errors, render_errors, ConfigError};
pub use loader::{load_config_from_path, load_config_from_str};
pub use model::{
    LlmConfig, LogConfig, NotifyMode, ProxyConfig, RecapConfig, StorageConfig, SummaryConfig,
    TelegramConfig,
};
pub use schedule::parse_cron_expression;
pub use validation::validate_config;
