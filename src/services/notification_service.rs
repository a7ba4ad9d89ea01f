use std::time::Duration;

use serde_json::json;
use teloxide::prelude::*;

use crate::enums::NotificationChannel;
use crate::error::{ AppError, Result };

/// Best-effort delivery across a set of channels. Telegram goes through
/// the bot API; email and push are handed to an external gateway. A
/// delivery failure is logged and swallowed, never propagated: the state
/// change a notification describes has already been committed.
pub struct NotificationService {
    bot: Option<Bot>,
    gateway_url: Option<String>,
    client: reqwest::Client,
}

impl NotificationService {
    pub fn new(
        telegram_bot_token: Option<String>,
        gateway_url: Option<String>,
        timeout: Duration
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            bot: telegram_bot_token.map(Bot::new),
            gateway_url,
            client,
        })
    }

    /// Dispatch `message` to every requested channel. Returns true when at
    /// least one channel accepted the message.
    pub async fn notify(
        &self,
        user_id: &str,
        channels: &[NotificationChannel],
        message: &str,
        metadata: serde_json::Value
    ) -> bool {
        let mut delivered = false;

        for channel in channels {
            let ok = match channel {
                NotificationChannel::Telegram => self.send_telegram(user_id, message).await,
                NotificationChannel::Email | NotificationChannel::Push =>
                    self.send_via_gateway(user_id, *channel, message, &metadata).await,
            };

            if ok {
                delivered = true;
            } else {
                tracing::warn!(
                    "Notification delivery failed for user {} on channel {}",
                    user_id,
                    channel
                );
            }
        }

        delivered
    }

    async fn send_telegram(&self, user_id: &str, message: &str) -> bool {
        let Some(bot) = &self.bot else {
            tracing::debug!("Telegram channel requested but no bot token configured");
            return false;
        };

        let Ok(chat_id) = user_id.parse::<i64>() else {
            tracing::debug!("User id {} is not a telegram chat id", user_id);
            return false;
        };

        match bot.send_message(ChatId(chat_id), message).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Telegram send failed for user {}: {}", user_id, e);
                false
            }
        }
    }

    async fn send_via_gateway(
        &self,
        user_id: &str,
        channel: NotificationChannel,
        message: &str,
        metadata: &serde_json::Value
    ) -> bool {
        let Some(gateway_url) = &self.gateway_url else {
            tracing::debug!("{} channel requested but no gateway configured", channel);
            return false;
        };

        let payload = json!({
            "user_id": user_id,
            "channel": channel.as_str(),
            "message": message,
            "metadata": metadata,
        });

        match self.client.post(gateway_url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(
                    "Notification gateway returned status {} for user {}",
                    response.status(),
                    user_id
                );
                false
            }
            Err(e) => {
                tracing::warn!("Notification gateway error for user {}: {}", user_id, e);
                false
            }
        }
    }
}
