// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summary delivery via the Telegram Bot API.
//!
//! Delivery is at-least-once: a failed send surfaces as an error and the
//! scheduler's delivery retry resends the whole text from the first
//! segment, so recipients may see duplicate segments after a partial
//! failure.

use async_trait::async_trait;
use recap_config::{NotifyMode, SummaryConfig, TelegramConfig};
use recap_core::{Notifier, RecapError};
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use tracing::{error, info, warn};

use crate::split::split_message;

/// Delivers rendered summaries over the Telegram Bot API.
pub struct TelegramNotifier {
    bot: Bot,
    mode: NotifyMode,
    notify_user_ids: Vec<i64>,
}

impl TelegramNotifier {
    /// Creates a notifier from configuration.
    ///
    /// Requires `telegram.bot_token`; honors the SOCKS5 proxy when one
    /// is configured.
    pub fn new(
        telegram: &TelegramConfig,
        summary: &SummaryConfig,
        proxy_url: Option<String>,
    ) -> Result<Self, RecapError> {
        let token = telegram.bot_token.as_deref().ok_or_else(|| {
            RecapError::Config("telegram.bot_token is required for summary delivery".into())
        })?;
        if token.is_empty() {
            return Err(RecapError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = match proxy_url {
            Some(url) => {
                let proxy = reqwest::Proxy::all(&url).map_err(|e| {
                    RecapError::Config(format!("invalid proxy url `{url}`: {e}"))
                })?;
                let client = reqwest::Client::builder()
                    .proxy(proxy)
                    .build()
                    .map_err(|e| RecapError::Notify {
                        message: format!("failed to build HTTP client: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                Bot::with_client(token, client)
            }
            None => Bot::new(token),
        };

        Ok(Self {
            bot,
            mode: summary.notify_mode,
            notify_user_ids: summary.notify_user_ids.clone(),
        })
    }

    /// Sends every segment of `content` to one chat, in order.
    async fn send_segments(&self, chat_id: i64, content: &str) -> Result<(), RecapError> {
        for segment in split_message(content) {
            self.bot
                .send_message(ChatId(chat_id), segment)
                .parse_mode(ParseMode::Html)
                .await
                .map_err(|e| RecapError::Notify {
                    message: format!("failed to send message to chat {chat_id}: {e}"),
                    source: Some(Box::new(e)),
                })?;
        }
        Ok(())
    }

    async fn notify_private(&self, content: &str) -> Result<(), RecapError> {
        if self.notify_user_ids.is_empty() {
            warn!("private delivery requested but no notify_user_ids configured");
            return Ok(());
        }
        for &user_id in &self.notify_user_ids {
            self.send_segments(user_id, content).await?;
            info!(user_id, "summary delivered privately");
        }
        Ok(())
    }

    async fn notify_group(&self, content: &str, chat_id: i64) -> Result<(), RecapError> {
        self.send_segments(chat_id, content).await?;
        info!(chat_id, "summary delivered to group");
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, content: &str, chat_id: i64) -> Result<(), RecapError> {
        if content.is_empty() {
            return Ok(());
        }

        match self.mode {
            NotifyMode::Private => self.notify_private(content).await,
            NotifyMode::Group => self.notify_group(content, chat_id).await,
            NotifyMode::Both => {
                // Each leg fails independently; a failed leg is logged
                // rather than failing the whole delivery.
                if let Err(e) = self.notify_private(content).await {
                    error!(error = %e, "private delivery failed");
                }
                if let Err(e) = self.notify_group(content, chat_id).await {
                    error!(error = %e, chat_id, "group delivery failed");
                }
                Ok(())
            }
        }
    }
}
