//! Notification fan-out to Telegram and Discord
//!
//! Delivery is best-effort: both channel sends run concurrently, each
//! failure is captured per channel, and nothing propagates to the caller.
//! There is no retry and no timeout on this path.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::modules::alert::{AlertPriority, AlertTrigger, Channel};
use crate::utils::metrics::MetricsService;

/// Discord embed colors by priority
const COLOR_HIGH: u32 = 0x00DC_2626;
const COLOR_MEDIUM: u32 = 0x00F5_9E0B;
const COLOR_LOW: u32 = 0x003B_82F6;

/// Per-channel delivery result from a connectivity test
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChannelStatus {
    pub telegram: bool,
    pub discord: bool,
}

/// Seam the alert engine dispatches through
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    /// Deliver an alert; true if at least one channel succeeded
    async fn send_alert(&self, alert: &AlertTrigger) -> bool;
}

/// Telegram + Discord notification sender
pub struct NotificationService {
    client: reqwest::Client,
    telegram_bot_token: Option<String>,
    telegram_chat_id: Option<String>,
    discord_webhook_url: Option<String>,
    metrics: Arc<MetricsService>,
}

impl NotificationService {
    pub fn new(config: &Config, metrics: Arc<MetricsService>) -> Self {
        if config.telegram_bot_token.is_some() && config.telegram_chat_id.is_some() {
            info!(target: "NOTIFIER", "Telegram channel configured");
        }
        if config.discord_webhook_url.is_some() {
            info!(target: "NOTIFIER", "Discord channel configured");
        }

        Self {
            client: reqwest::Client::new(),
            telegram_bot_token: config.telegram_bot_token.clone(),
            telegram_chat_id: config.telegram_chat_id.clone(),
            discord_webhook_url: config.discord_webhook_url.clone(),
            metrics,
        }
    }

    /// Probe both channels with a short test message
    pub async fn test_channels(&self) -> ChannelStatus {
        let text = "\u{1F6E1} Memewatch channel test".to_string();
        let embed = json!({
            "title": "Memewatch channel test",
            "description": "Channel connectivity check",
            "color": COLOR_LOW,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let (telegram, discord) = tokio::join!(
            self.post_telegram(text),
            self.post_discord(embed),
        );

        ChannelStatus { telegram, discord }
    }

    async fn send_telegram(&self, alert: &AlertTrigger) -> bool {
        if !alert.channels.contains(&Channel::Telegram) {
            return false;
        }
        self.post_telegram(format_telegram_message(alert)).await
    }

    async fn post_telegram(&self, text: String) -> bool {
        let (token, chat_id) = match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(token), Some(chat_id)) => (token, chat_id),
            _ => {
                warn!(target: "NOTIFIER", "Telegram credentials missing, skipping channel");
                return false;
            }
        };

        let url = format!("https://api.telegram.org/bot{}/sendMessage", token);
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        match self.client.post(&url).json(&body).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                error!(target: "NOTIFIER", "Telegram API returned {}", response.status());
                false
            }
            Err(e) => {
                error!(target: "NOTIFIER", "Telegram send failed: {}", e);
                false
            }
        }
    }

    async fn send_discord(&self, alert: &AlertTrigger) -> bool {
        if !alert.channels.contains(&Channel::Discord) {
            return false;
        }
        self.post_discord(build_discord_embed(alert)).await
    }

    async fn post_discord(&self, embed: serde_json::Value) -> bool {
        let webhook_url = match &self.discord_webhook_url {
            Some(url) => url,
            None => {
                warn!(target: "NOTIFIER", "Discord webhook missing, skipping channel");
                return false;
            }
        };

        let body = json!({ "embeds": [embed] });

        match self.client.post(webhook_url).json(&body).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                error!(target: "NOTIFIER", "Discord webhook returned {}", response.status());
                false
            }
            Err(e) => {
                error!(target: "NOTIFIER", "Discord send failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl AlertNotifier for NotificationService {
    async fn send_alert(&self, alert: &AlertTrigger) -> bool {
        // Both sends run to completion independently; partial failure does
        // not fail the alert
        let (telegram, discord) = tokio::join!(
            self.send_telegram(alert),
            self.send_discord(alert),
        );

        // Outcomes are recorded per channel the alert actually targeted
        if alert.channels.contains(&Channel::Telegram) {
            self.metrics.record_notification("telegram", telegram);
        }
        if alert.channels.contains(&Channel::Discord) {
            self.metrics.record_notification("discord", discord);
        }

        let delivered = telegram || discord;
        if delivered {
            info!(
                target: "NOTIFIER",
                "Alert {} delivered (telegram={}, discord={})",
                alert.id, telegram, discord
            );
        } else {
            warn!(target: "NOTIFIER", "Alert {} not delivered on any channel", alert.id);
        }
        delivered
    }
}

fn alert_emoji(alert: &AlertTrigger) -> &'static str {
    match alert.alert_type {
        crate::modules::alert::AlertType::Whale => "\u{1F40B}",
        crate::modules::alert::AlertType::Swap => "\u{1F501}",
        crate::modules::alert::AlertType::Rug => "\u{1F6A8}",
        crate::modules::alert::AlertType::Volume => "\u{1F4C8}",
        crate::modules::alert::AlertType::NewToken => "\u{1F195}",
        crate::modules::alert::AlertType::Honeypot => "\u{26A0}\u{FE0F}",
    }
}

fn format_telegram_message(alert: &AlertTrigger) -> String {
    let mut text = format!(
        "{} <b>{} ALERT</b>\n\n{}",
        alert_emoji(alert),
        alert.alert_type.as_str().to_uppercase().replace('_', " "),
        alert.description
    );

    if let Some(token) = &alert.token_address {
        text.push_str(&format!("\n\nToken: <code>{}</code>", token));
    }
    if let Some(wallet) = &alert.wallet_address {
        text.push_str(&format!("\nWallet: <code>{}</code>", wallet));
    }
    if let Some(amount) = &alert.amount {
        text.push_str(&format!("\nAmount: {}", amount));
    }

    text.push_str(&format!(
        "\n\n<i>Priority: {}</i>",
        alert.priority.as_str()
    ));
    text
}

fn build_discord_embed(alert: &AlertTrigger) -> serde_json::Value {
    let color = match alert.priority {
        AlertPriority::High => COLOR_HIGH,
        AlertPriority::Medium => COLOR_MEDIUM,
        AlertPriority::Low => COLOR_LOW,
    };

    let mut fields = Vec::new();
    if let Some(token) = &alert.token_address {
        fields.push(json!({ "name": "Token", "value": token, "inline": true }));
    }
    if let Some(wallet) = &alert.wallet_address {
        fields.push(json!({ "name": "Wallet", "value": wallet, "inline": true }));
    }
    if let Some(amount) = &alert.amount {
        fields.push(json!({ "name": "Amount", "value": amount, "inline": true }));
    }
    fields.push(json!({
        "name": "Priority",
        "value": alert.priority.as_str(),
        "inline": true
    }));

    json!({
        "title": format!(
            "{} {} alert",
            alert_emoji(alert),
            alert.alert_type.as_str().replace('_', " ")
        ),
        "description": alert.description,
        "color": color,
        "timestamp": alert.timestamp.to_rfc3339(),
        "fields": fields,
        "footer": { "text": "Memewatch" },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::alert::{AlertType, Channel};
    use std::collections::HashSet;

    fn unconfigured_service() -> NotificationService {
        NotificationService {
            client: reqwest::Client::new(),
            telegram_bot_token: None,
            telegram_chat_id: None,
            discord_webhook_url: None,
            metrics: Arc::new(MetricsService::new()),
        }
    }

    fn whale_alert() -> AlertTrigger {
        let channels: HashSet<Channel> =
            [Channel::Telegram, Channel::Discord].into_iter().collect();
        AlertTrigger::new(
            AlertType::Whale,
            "Top holder controls 8% of supply".to_string(),
            channels,
        )
        .with_token("So11111111111111111111111111111111111111112")
        .with_amount("5,000 tokens".to_string())
    }

    #[tokio::test]
    async fn unconfigured_channels_return_false_without_network() {
        let service = unconfigured_service();
        assert!(!service.send_alert(&whale_alert()).await);

        let status = service.test_channels().await;
        assert!(!status.telegram);
        assert!(!status.discord);
    }

    #[tokio::test]
    async fn disabled_channels_are_skipped() {
        // Credentials present but the alert carries no channels, so no
        // delivery is attempted
        let service = NotificationService {
            client: reqwest::Client::new(),
            telegram_bot_token: Some("token".to_string()),
            telegram_chat_id: Some("chat".to_string()),
            discord_webhook_url: Some("https://discord.test/webhook".to_string()),
            metrics: Arc::new(MetricsService::new()),
        };

        let mut alert = whale_alert();
        alert.channels.clear();
        assert!(!service.send_alert(&alert).await);
    }

    #[tokio::test]
    async fn dispatch_outcomes_are_counted_per_channel() {
        let metrics = Arc::new(MetricsService::new());
        let service = NotificationService {
            client: reqwest::Client::new(),
            telegram_bot_token: None,
            telegram_chat_id: None,
            discord_webhook_url: None,
            metrics: metrics.clone(),
        };

        // Both channels targeted, neither configured, so both count as failed
        service.send_alert(&whale_alert()).await;

        let exported = metrics.get_metrics();
        assert!(exported
            .contains(r#"memewatch_notifications_sent_total{channel="discord",outcome="failed"} 1"#));
        assert!(exported
            .contains(r#"memewatch_notifications_sent_total{channel="telegram",outcome="failed"} 1"#));

        // An alert with no target channels records nothing new
        let mut silent = whale_alert();
        silent.channels.clear();
        service.send_alert(&silent).await;
        assert!(!metrics.get_metrics().contains(r#"outcome="delivered""#));
    }

    #[test]
    fn telegram_message_is_html_formatted() {
        let text = format_telegram_message(&whale_alert());
        assert!(text.contains("<b>WHALE ALERT</b>"));
        assert!(text.contains("8% of supply"));
        assert!(text.contains("<code>So11111111111111111111111111111111111111112</code>"));
        assert!(text.contains("Priority: high"));
    }

    #[test]
    fn discord_embed_color_tracks_priority() {
        let embed = build_discord_embed(&whale_alert());
        assert_eq!(embed["color"], COLOR_HIGH);
        assert_eq!(embed["footer"]["text"], "Memewatch");

        let fields = embed["fields"].as_array().unwrap();
        assert!(fields.iter().any(|f| f["name"] == "Priority"));
        assert!(fields.iter().any(|f| f["name"] == "Amount"));
    }
}
