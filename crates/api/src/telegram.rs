//! Telegram delivery channel.
//!
//! Two bots share one chat: an alert bot for threshold breaches and a
//! log bot for routine position logs (sent silently when requested).

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use lendwatch_core::TelegramSettings;

/// Outbound notification channel. Delivery failures are soft; a
/// `false` return never aborts the monitoring cycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an alert message. Returns `true` on success.
    async fn send_alert(&self, message: &str, subject: &str) -> bool;

    /// Deliver a routine log message, optionally without a
    /// notification sound.
    async fn send_log(&self, message: &str, silent: bool) -> bool;
}

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    settings: TelegramSettings,
}

impl TelegramNotifier {
    pub fn new(settings: TelegramSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    async fn send_message(&self, bot_token: &str, text: &str, silent: bool) -> bool {
        if !self.settings.enabled {
            debug!("telegram channel disabled, skipping send");
            return false;
        }
        if bot_token.is_empty() || self.settings.chat_id.is_empty() {
            warn!("telegram credentials not configured, skipping send");
            return false;
        }

        let url = format!("https://api.telegram.org/bot{bot_token}/sendMessage");
        let body = json!({
            "chat_id": self.settings.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_notification": silent,
        });

        match self.client.post(&url).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(silent, "telegram message delivered");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "telegram send rejected");
                false
            }
            Err(err) => {
                warn!(error = %err, "telegram send failed");
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_alert(&self, message: &str, subject: &str) -> bool {
        let text = if subject.is_empty() {
            message.to_string()
        } else {
            format!("<b>{subject}</b>\n\n{message}")
        };
        self.send_message(&self.settings.alert_bot_token, &text, false)
            .await
    }

    async fn send_log(&self, message: &str, silent: bool) -> bool {
        self.send_message(&self.settings.log_bot_token, message, silent)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_channel_fails_soft() {
        let notifier = TelegramNotifier::new(TelegramSettings::default());
        assert!(!notifier.send_alert("body", "subject").await);
        assert!(!notifier.send_log("body", true).await);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_soft() {
        let settings = TelegramSettings {
            enabled: true,
            ..TelegramSettings::default()
        };
        let notifier = TelegramNotifier::new(settings);
        assert!(!notifier.send_alert("body", "subject").await);
        assert!(!notifier.send_log("body", false).await);
    }
}
