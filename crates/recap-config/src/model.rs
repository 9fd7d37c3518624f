// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the recap service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so unrecognized keys
//! are rejected at startup with an actionable diagnostic.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level recap configuration.
///
/// Loaded from a YAML file with environment variable overrides. All
/// sections are optional at deserialization time; required values are
/// enforced by [`crate::validation::validate_config`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecapConfig {
    /// Chat-platform credentials and notifier bot settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Optional SOCKS5 proxy for all outbound connections.
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// OpenAI-compatible LLM endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Daily summarization schedule and delivery settings.
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Chat-platform configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram application ID for the capture client. Required.
    #[serde(default)]
    pub api_id: i32,

    /// Telegram application hash for the capture client. Required.
    #[serde(default)]
    pub api_hash: String,

    /// Bot API token used by the notifier to deliver summaries.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Optional SOCKS5 proxy for outbound traffic.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    #[serde(default)]
    pub enable: bool,

    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub port: u16,
}

impl ProxyConfig {
    /// The `socks5h://host:port` URL, or `None` when the proxy is disabled.
    pub fn url(&self) -> Option<String> {
        if self.enable {
            Some(format!("socks5h://{}:{}", self.host, self.port))
        } else {
            None
        }
    }
}

/// OpenAI-compatible LLM endpoint configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Base URL of the chat-completions endpoint. Required.
    #[serde(default)]
    pub base_url: String,

    /// API key sent as a bearer token. Required.
    #[serde(default)]
    pub api_key: String,

    /// Model identifier, e.g. `gpt-4o` or `deepseek-chat`. Required.
    #[serde(default)]
    pub model: String,

    /// Model context window in tokens. The summarizer reserves 2000
    /// tokens of this for the system prompt and output.
    #[serde(default)]
    pub max_tokens: usize,
}

/// Where summaries are delivered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotifyMode {
    /// Direct message to each configured user.
    Private,
    /// Post back into the summarized chat.
    #[default]
    Group,
    /// Both of the above.
    Both,
}

/// Daily summarization schedule and delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryConfig {
    /// 5-field cron expression, evaluated in UTC. Required.
    #[serde(default)]
    pub cron: String,

    /// Window size in days; 0 is treated as 1.
    #[serde(default = "default_range_days")]
    pub range_days: u32,

    /// Days of message history kept after each run.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Delivery mode for rendered summaries.
    #[serde(default)]
    pub notify_mode: NotifyMode,

    /// Target user IDs for private delivery. Required when
    /// `notify_mode` is `private` or `both`.
    #[serde(default)]
    pub notify_user_ids: Vec<i64>,

    /// Retry count for summary generation and the chat-id query.
    #[serde(default = "default_retry_times")]
    pub retry_times: u32,

    /// Seconds between retry attempts.
    #[serde(default = "default_retry_interval")]
    pub retry_interval: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            cron: String::new(),
            range_days: default_range_days(),
            retention_days: default_retention_days(),
            notify_mode: NotifyMode::default(),
            notify_user_ids: Vec::new(),
            retry_times: default_retry_times(),
            retry_interval: default_retry_interval(),
        }
    }
}

fn default_range_days() -> u32 {
    1
}

fn default_retention_days() -> u32 {
    7
}

fn default_retry_times() -> u32 {
    3
}

fn default_retry_interval() -> u64 {
    60
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "data/recap.db".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
