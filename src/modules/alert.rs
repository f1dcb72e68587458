//! Alert trigger types and the bounded in-memory alert store

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Maximum number of triggers kept in memory; oldest entries are evicted
pub const MAX_STORED_ALERTS: usize = 100;

/// Delivery channel for alert notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Telegram,
    Discord,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Telegram => "telegram",
            Channel::Discord => "discord",
        }
    }
}

/// Kind of event that raised an alert (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Whale,
    Swap,
    Rug,
    Volume,
    NewToken,
    Honeypot,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Whale => "whale",
            AlertType::Swap => "swap",
            AlertType::Rug => "rug",
            AlertType::Volume => "volume",
            AlertType::NewToken => "new_token",
            AlertType::Honeypot => "honeypot",
        }
    }

    /// Priority is fixed per type at creation and never changes
    pub fn priority(&self) -> AlertPriority {
        match self {
            AlertType::Whale | AlertType::Rug | AlertType::Honeypot => AlertPriority::High,
            AlertType::Swap | AlertType::Volume => AlertPriority::Medium,
            AlertType::NewToken => AlertPriority::Low,
        }
    }
}

/// Alert priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

impl AlertPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPriority::High => "high",
            AlertPriority::Medium => "medium",
            AlertPriority::Low => "low",
        }
    }
}

/// A single triggered alert
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertTrigger {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub token_address: Option<String>,
    pub wallet_address: Option<String>,
    pub amount: Option<String>,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub channels: HashSet<Channel>,
    pub is_read: bool,
    pub is_starred: bool,
}

impl AlertTrigger {
    /// Build a trigger; the id is the type tag plus creation millis
    pub fn new(alert_type: AlertType, description: String, channels: HashSet<Channel>) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!("{}-{}", alert_type.as_str(), timestamp.timestamp_millis()),
            alert_type,
            priority: alert_type.priority(),
            token_address: None,
            wallet_address: None,
            amount: None,
            description,
            timestamp,
            channels,
            is_read: false,
            is_starred: false,
        }
    }

    pub fn with_token(mut self, address: &str) -> Self {
        self.token_address = Some(address.to_string());
        self
    }

    pub fn with_wallet(mut self, address: &str) -> Self {
        self.wallet_address = Some(address.to_string());
        self
    }

    pub fn with_amount(mut self, amount: String) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// Detector thresholds and alerting flags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    pub whale_threshold: f64,
    pub volume_spike_threshold: f64,
    pub rug_pull_confidence: f64,
    pub enabled_channels: HashSet<Channel>,
    pub auto_analysis: bool,
    pub notifications_enabled: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            whale_threshold: 10_000.0,
            volume_spike_threshold: 5.0,
            rug_pull_confidence: 70.0,
            enabled_channels: [Channel::Telegram, Channel::Discord].into_iter().collect(),
            auto_analysis: true,
            notifications_enabled: true,
        }
    }
}

/// Partial config used for shallow-merge updates; absent fields keep
/// their current value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfigUpdate {
    pub whale_threshold: Option<f64>,
    pub volume_spike_threshold: Option<f64>,
    pub rug_pull_confidence: Option<f64>,
    pub enabled_channels: Option<HashSet<Channel>>,
    pub auto_analysis: Option<bool>,
    pub notifications_enabled: Option<bool>,
}

impl AlertConfig {
    /// Shallow-merge an update into this config
    pub fn merge(&mut self, update: AlertConfigUpdate) {
        if let Some(v) = update.whale_threshold {
            self.whale_threshold = v;
        }
        if let Some(v) = update.volume_spike_threshold {
            self.volume_spike_threshold = v;
        }
        if let Some(v) = update.rug_pull_confidence {
            self.rug_pull_confidence = v;
        }
        if let Some(v) = update.enabled_channels {
            self.enabled_channels = v;
        }
        if let Some(v) = update.auto_analysis {
            self.auto_analysis = v;
        }
        if let Some(v) = update.notifications_enabled {
            self.notifications_enabled = v;
        }
    }
}

/// Bounded in-memory alert list, newest first
///
/// Owned by the caller and shared by reference so lifetime is explicit
/// rather than module-level state.
pub struct AlertStore {
    alerts: RwLock<VecDeque<AlertTrigger>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self {
            alerts: RwLock::new(VecDeque::with_capacity(MAX_STORED_ALERTS)),
        }
    }

    /// Prepend an alert and trim to [`MAX_STORED_ALERTS`]
    pub fn add(&self, alert: AlertTrigger) {
        let mut alerts = self.alerts.write();
        alerts.push_front(alert);
        alerts.truncate(MAX_STORED_ALERTS);
    }

    /// Mark an alert as read; returns false if the id is unknown
    pub fn mark_as_read(&self, id: &str) -> bool {
        let mut alerts = self.alerts.write();
        match alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.is_read = true;
                true
            }
            None => false,
        }
    }

    /// Flip the starred flag; returns the new value, or None for an
    /// unknown id
    pub fn toggle_star(&self, id: &str) -> Option<bool> {
        let mut alerts = self.alerts.write();
        alerts.iter_mut().find(|a| a.id == id).map(|alert| {
            alert.is_starred = !alert.is_starred;
            alert.is_starred
        })
    }

    /// Most recent alerts, up to `limit`
    pub fn recent(&self, limit: usize) -> Vec<AlertTrigger> {
        let alerts = self.alerts.read();
        alerts.iter().take(limit).cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<AlertTrigger> {
        let alerts = self.alerts.read();
        alerts.iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.alerts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.read().is_empty()
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(n: usize) -> AlertTrigger {
        let mut alert = AlertTrigger::new(
            AlertType::Whale,
            format!("alert {}", n),
            HashSet::new(),
        );
        // Creation millis collide in a tight loop; make the ids distinct
        alert.id = format!("whale-{}", n);
        alert
    }

    #[test]
    fn store_trims_to_capacity_newest_first() {
        let store = AlertStore::new();
        for n in 0..101 {
            store.add(trigger(n));
        }
        assert_eq!(store.len(), MAX_STORED_ALERTS);

        let recent = store.recent(1);
        assert_eq!(recent[0].description, "alert 100");

        // Oldest entry evicted
        assert!(store.get("whale-0").is_none());
        assert!(store.get("whale-1").is_some());
    }

    #[test]
    fn toggle_star_round_trips() {
        let store = AlertStore::new();
        store.add(trigger(1));

        assert_eq!(store.toggle_star("whale-1"), Some(true));
        assert_eq!(store.toggle_star("whale-1"), Some(false));
        assert!(!store.get("whale-1").unwrap().is_starred);
    }

    #[test]
    fn mark_as_read_by_id() {
        let store = AlertStore::new();
        store.add(trigger(1));
        store.add(trigger(2));

        assert!(store.mark_as_read("whale-1"));
        assert!(store.get("whale-1").unwrap().is_read);
        assert!(!store.get("whale-2").unwrap().is_read);
        assert!(!store.mark_as_read("whale-99"));
    }

    #[test]
    fn priority_is_fixed_per_type() {
        assert_eq!(AlertType::Whale.priority(), AlertPriority::High);
        assert_eq!(AlertType::Rug.priority(), AlertPriority::High);
        assert_eq!(AlertType::Honeypot.priority(), AlertPriority::High);
        assert_eq!(AlertType::Volume.priority(), AlertPriority::Medium);
        assert_eq!(AlertType::NewToken.priority(), AlertPriority::Low);
    }

    #[test]
    fn config_merge_is_shallow() {
        let mut config = AlertConfig::default();
        config.merge(AlertConfigUpdate {
            whale_threshold: Some(50_000.0),
            notifications_enabled: Some(false),
            ..Default::default()
        });

        assert_eq!(config.whale_threshold, 50_000.0);
        assert!(!config.notifications_enabled);
        // Untouched fields keep their values
        assert_eq!(config.volume_spike_threshold, 5.0);
        assert_eq!(config.rug_pull_confidence, 70.0);
        assert!(config.auto_analysis);
    }
}
