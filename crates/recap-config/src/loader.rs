// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier): compiled defaults, the YAML
//! file selected with `-f`, then `RECAP_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};

use crate::model::RecapConfig;

/// Load configuration from a specific YAML file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RecapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecapConfig::default()))
        .merge(Yaml::file(path))
        .merge(env_provider())
        .extract()
}

/// Load configuration from inline YAML content only (no env overrides).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(yaml_content: &str) -> Result<RecapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecapConfig::default()))
        .merge(Yaml::string(yaml_content))
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `RECAP_LLM_BASE_URL` must map to
/// `llm.base_url`, not `llm.base.url`.
fn env_provider() -> Env {
    Env::prefixed("RECAP_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped,
        // e.g. RECAP_LLM_BASE_URL -> "llm_base_url".
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("telegram_", "telegram.", 1)
            .replacen("proxy_", "proxy.", 1)
            .replacen("llm_", "llm.", 1)
            .replacen("summary_", "summary.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NotifyMode;

    const FULL_YAML: &str = r#"
telegram:
  api_id: 12345
  api_hash: "abcdef"
  bot_token: "123:token"
llm:
  base_url: "https://api.example.com/v1"
  api_key: "sk-test"
  model: "gpt-4o"
  max_tokens: 128000
summary:
  cron: "0 0 * * *"
  range_days: 1
  retention_days: 14
  notify_mode: private
  notify_user_ids: [1001, 1002]
"#;

    #[test]
    fn full_yaml_loads() {
        let config = load_config_from_str(FULL_YAML).unwrap();
        assert_eq!(config.telegram.api_id, 12345);
        assert_eq!(config.llm.max_tokens, 128000);
        assert_eq!(config.summary.cron, "0 0 * * *");
        assert_eq!(config.summary.notify_mode, NotifyMode::Private);
        assert_eq!(config.summary.notify_user_ids, vec![1001, 1002]);
        // Unset sections fall back to defaults.
        assert_eq!(config.summary.retry_times, 3);
        assert_eq!(config.storage.database_path, "data/recap.db");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let yaml = r#"
summary:
  corn: "0 0 * * *"
"#;
        let result = load_config_from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn empty_input_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.summary.range_days, 1);
        assert!(config.telegram.api_hash.is_empty());
    }
}
