// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: required credentials, a parseable cron expression, and
//! the notify-mode/user-id coupling.

use crate::diagnostic::ConfigError;
use crate::model::{NotifyMode, RecapConfig};
use crate::schedule::parse_cron_expression;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &RecapConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.telegram.api_id == 0 {
        errors.push(ConfigError::Validation {
            message: "telegram.api_id is required and must be non-zero".to_string(),
        });
    }
    if config.telegram.api_hash.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "telegram.api_hash is required".to_string(),
        });
    }

    if config.proxy.enable {
        if config.proxy.host.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "proxy.host must be set when proxy.enable is true".to_string(),
            });
        }
        if config.proxy.port == 0 {
            errors.push(ConfigError::Validation {
                message: "proxy.port must be non-zero when proxy.enable is true".to_string(),
            });
        }
    }

    if config.llm.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "llm.base_url is required".to_string(),
        });
    }
    if config.llm.api_key.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "llm.api_key is required".to_string(),
        });
    }
    if config.llm.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "llm.model is required".to_string(),
        });
    }
    if config.llm.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "llm.max_tokens must be greater than 0".to_string(),
        });
    }

    if config.summary.cron.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "summary.cron is required".to_string(),
        });
    } else if let Err(e) = parse_cron_expression(&config.summary.cron) {
        errors.push(ConfigError::Validation { message: e });
    }

    if matches!(
        config.summary.notify_mode,
        NotifyMode::Private | NotifyMode::Both
    ) && config.summary.notify_user_ids.is_empty()
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "summary.notify_user_ids must not be empty when summary.notify_mode is `{}`",
                config.summary.notify_mode
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LlmConfig, SummaryConfig, TelegramConfig};

    fn valid_config() -> RecapConfig {
        RecapConfig {
            telegram: TelegramConfig {
                api_id: 12345,
                api_hash: "hash".into(),
                bot_token: Some("123:token".into()),
            },
            llm: LlmConfig {
                base_url: "https://api.example.com/v1".into(),
                api_key: "sk-test".into(),
                model: "gpt-4o".into(),
                max_tokens: 128000,
            },
            summary: SummaryConfig {
                cron: "0 23 * * *".into(),
                ..SummaryConfig::default()
            },
            ..RecapConfig::default()
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn default_config_fails_on_required_fields() {
        let errors = validate_config(&RecapConfig::default()).unwrap_err();
        let messages: Vec<_> = errors.iter().map(|e| e.to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("telegram.api_id")));
        assert!(messages.iter().any(|m| m.contains("llm.api_key")));
        assert!(messages.iter().any(|m| m.contains("summary.cron")));
    }

    #[test]
    fn bad_cron_fails() {
        let mut config = valid_config();
        config.summary.cron = "every day at noon".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("cron"))));
    }

    #[test]
    fn private_mode_requires_user_ids() {
        let mut config = valid_config();
        config.summary.notify_mode = NotifyMode::Private;
        config.summary.notify_user_ids.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("notify_user_ids"))
        ));

        config.summary.notify_user_ids = vec![42];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn group_mode_needs_no_user_ids() {
        let mut config = valid_config();
        config.summary.notify_mode = NotifyMode::Group;
        config.summary.notify_user_ids.clear();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn enabled_proxy_requires_host_and_port() {
        let mut config = valid_config();
        config.proxy.enable = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("proxy.host"))));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("proxy.port"))));
    }
}
