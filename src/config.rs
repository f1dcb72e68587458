//! Configuration module for Memewatch

use std::collections::HashSet;
use std::env;

use crate::modules::alert::{AlertConfig, Channel};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Analysis executor endpoint
    pub analysis_api_url: String,

    // Telegram Alerts
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    // Discord Alerts
    pub discord_webhook_url: Option<String>,

    // Detector thresholds
    pub whale_threshold: f64,
    pub volume_spike_threshold: f64,
    pub rug_pull_confidence: f64,

    // Alerting behavior
    pub enabled_channels: HashSet<Channel>,
    pub auto_analysis: bool,
    pub notifications_enabled: bool,

    // Dashboard
    pub dashboard_port: u16,

    // Persistence
    pub database_path: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            analysis_api_url: env::var("ANALYSIS_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080/analyze".to_string()),

            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
            telegram_chat_id: env::var("TELEGRAM_CHAT_ID").ok(),

            discord_webhook_url: env::var("DISCORD_WEBHOOK_URL").ok(),

            whale_threshold: env::var("WHALE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000.0),
            volume_spike_threshold: env::var("VOLUME_SPIKE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5.0),
            rug_pull_confidence: env::var("RUG_PULL_CONFIDENCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(70.0),

            enabled_channels: env::var("ENABLED_CHANNELS")
                .map(|v| parse_channels(&v))
                .unwrap_or_else(|_| {
                    [Channel::Telegram, Channel::Discord].into_iter().collect()
                }),
            auto_analysis: env::var("AUTO_ANALYSIS")
                .map(|v| v != "false")
                .unwrap_or(true),
            notifications_enabled: env::var("NOTIFICATIONS_ENABLED")
                .map(|v| v != "false")
                .unwrap_or(true),

            dashboard_port: env::var("DASHBOARD_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/memewatch.db".to_string()),
        }
    }

    /// Detector thresholds and alerting flags as an [`AlertConfig`]
    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            whale_threshold: self.whale_threshold,
            volume_spike_threshold: self.volume_spike_threshold,
            rug_pull_confidence: self.rug_pull_confidence,
            enabled_channels: self.enabled_channels.clone(),
            auto_analysis: self.auto_analysis,
            notifications_enabled: self.notifications_enabled,
        }
    }
}

fn parse_channels(raw: &str) -> HashSet<Channel> {
    raw.split(',')
        .filter_map(|s| match s.trim().to_lowercase().as_str() {
            "telegram" => Some(Channel::Telegram),
            "discord" => Some(Channel::Discord),
            _ => None,
        })
        .collect()
}
