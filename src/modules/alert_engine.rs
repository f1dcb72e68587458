//! Alert Engine - single-pass detection pipeline
//!
//! One `monitor_token` call fetches an analysis payload from the injected
//! executor, runs the five detectors against it, stores a trigger per
//! positive detection, and fans each one out through the notifier. Any
//! failure in the pipeline is caught at the top and degrades to an empty
//! result; partial work is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::modules::alert::{
    AlertConfig, AlertConfigUpdate, AlertStore, AlertTrigger, AlertType,
};
use crate::modules::analysis::{AnalysisData, AnalysisError, AnalysisExecutor};
use crate::utils::notifications::AlertNotifier;
use crate::utils::{DatabaseService, MetricsService};

/// Holder share of supply, in percent, that always counts as a whale
const WHALE_SUPPLY_PERCENT: f64 = 5.0;

/// Token age, in hours, under which a token counts as new
const NEW_TOKEN_AGE_HOURS: f64 = 24.0;

/// Per-token monitoring session, process-local
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSession {
    pub token_address: String,
    pub checks: u64,
    pub last_alert_count: usize,
    pub last_checked: DateTime<Utc>,
}

/// Engine statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub tokens_monitored: u64,
    pub alerts_triggered: u64,
    pub notifications_delivered: u64,
    pub stored_alerts: usize,
    pub sessions: usize,
}

/// Alert Engine module
pub struct AlertEngine {
    config: RwLock<AlertConfig>,
    executor: Arc<dyn AnalysisExecutor>,
    notifier: Arc<dyn AlertNotifier>,
    store: Arc<AlertStore>,
    database: DatabaseService,
    metrics: Arc<MetricsService>,

    sessions: DashMap<String, MonitorSession>,

    tokens_monitored: AtomicU64,
    alerts_triggered: AtomicU64,
    notifications_delivered: AtomicU64,

    alert_sender: broadcast::Sender<AlertTrigger>,
}

impl AlertEngine {
    /// Create a new alert engine
    pub fn new(
        config: AlertConfig,
        executor: Arc<dyn AnalysisExecutor>,
        notifier: Arc<dyn AlertNotifier>,
        store: Arc<AlertStore>,
        database: DatabaseService,
        metrics: Arc<MetricsService>,
    ) -> Self {
        let (alert_sender, _) = broadcast::channel(1000);

        info!(
            target: "ALERT_ENGINE",
            "Thresholds: whale={}, volume_spike={}x, rug_confidence={}%",
            config.whale_threshold,
            config.volume_spike_threshold,
            config.rug_pull_confidence
        );

        Self {
            config: RwLock::new(config),
            executor,
            notifier,
            store,
            database,
            metrics,
            sessions: DashMap::new(),
            tokens_monitored: AtomicU64::new(0),
            alerts_triggered: AtomicU64::new(0),
            notifications_delivered: AtomicU64::new(0),
            alert_sender,
        }
    }

    /// Subscribe to triggers as they are created
    pub fn subscribe(&self) -> broadcast::Receiver<AlertTrigger> {
        self.alert_sender.subscribe()
    }

    /// Run the detection pipeline for a token
    ///
    /// Returns every trigger raised by this call; an upstream failure
    /// yields an empty list and is only logged.
    pub async fn monitor_token(&self, token_address: &str) -> Vec<AlertTrigger> {
        match self.run_pipeline(token_address).await {
            Ok(alerts) => alerts,
            Err(e) => {
                error!(
                    target: "ALERT_ENGINE",
                    "Monitoring failed for {}: {}", token_address, e
                );
                Vec::new()
            }
        }
    }

    async fn run_pipeline(
        &self,
        token_address: &str,
    ) -> Result<Vec<AlertTrigger>, AnalysisError> {
        self.tokens_monitored.fetch_add(1, Ordering::SeqCst);
        self.metrics.tokens_monitored.inc();

        let intent = format!(
            "Analyze token {} for whale activity, volume spikes, rug risk, \
             token age, and honeypot behavior",
            token_address
        );

        let response = self.executor.analyze(&intent).await?;
        if !response.success {
            return Err(AnalysisError::Upstream(response.error));
        }

        // The auto_analysis flag is carried in the config but detection does
        // not gate on it; see DESIGN.md.
        let config = self.config.read().clone();
        let alerts = evaluate_detectors(&config, &response.data, token_address);

        for alert in &alerts {
            self.add_alert(alert.clone());

            if config.notifications_enabled {
                // Per-channel dispatch metrics are recorded by the notifier
                let delivered = self.notifier.send_alert(alert).await;
                if delivered {
                    self.notifications_delivered.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        self.record_session(token_address, alerts.len());

        if !alerts.is_empty() {
            info!(
                target: "ALERT_ENGINE",
                "{} trigger(s) for {}",
                alerts.len(),
                shorten_address(token_address, 4)
            );
        }

        Ok(alerts)
    }

    /// Store a trigger: prepend to the bounded list, persist, broadcast
    pub fn add_alert(&self, alert: AlertTrigger) {
        if let Err(e) = self.database.save_alert(&alert) {
            warn!(target: "ALERT_ENGINE", "Failed to persist alert {}: {}", alert.id, e);
        }

        self.alerts_triggered.fetch_add(1, Ordering::SeqCst);
        self.metrics.record_alert(alert.alert_type.as_str());

        let _ = self.alert_sender.send(alert.clone());
        self.store.add(alert);
        self.metrics.stored_alerts.set(self.store.len() as f64);
    }

    /// Mark a stored alert as read
    pub fn mark_as_read(&self, id: &str) -> bool {
        let found = self.store.mark_as_read(id);
        if found {
            if let Err(e) = self.database.mark_as_read(id) {
                warn!(target: "ALERT_ENGINE", "Failed to persist read flag for {}: {}", id, e);
            }
        }
        found
    }

    /// Flip an alert's starred flag; returns the new value
    pub fn toggle_star(&self, id: &str) -> Option<bool> {
        let starred = self.store.toggle_star(id)?;
        if let Err(e) = self.database.set_starred(id, starred) {
            warn!(target: "ALERT_ENGINE", "Failed to persist star flag for {}: {}", id, e);
        }
        Some(starred)
    }

    /// Shallow-merge a config update
    pub fn update_config(&self, update: AlertConfigUpdate) {
        let mut config = self.config.write();
        config.merge(update);
        info!(
            target: "ALERT_ENGINE",
            "Config updated: whale={}, volume_spike={}x, rug_confidence={}%, notifications={}",
            config.whale_threshold,
            config.volume_spike_threshold,
            config.rug_pull_confidence,
            config.notifications_enabled
        );
    }

    pub fn get_config(&self) -> AlertConfig {
        self.config.read().clone()
    }

    /// Recent triggers from the in-memory store
    pub fn recent_alerts(&self, limit: usize) -> Vec<AlertTrigger> {
        self.store.recent(limit)
    }

    /// Monitoring sessions, most recently checked first
    pub fn sessions(&self) -> Vec<MonitorSession> {
        let mut sessions: Vec<_> = self.sessions.iter().map(|e| e.value().clone()).collect();
        sessions.sort_by(|a, b| b.last_checked.cmp(&a.last_checked));
        sessions
    }

    /// Engine statistics
    pub fn get_stats(&self) -> EngineStats {
        EngineStats {
            tokens_monitored: self.tokens_monitored.load(Ordering::SeqCst),
            alerts_triggered: self.alerts_triggered.load(Ordering::SeqCst),
            notifications_delivered: self.notifications_delivered.load(Ordering::SeqCst),
            stored_alerts: self.store.len(),
            sessions: self.sessions.len(),
        }
    }

    fn record_session(&self, token_address: &str, alert_count: usize) {
        self.sessions
            .entry(token_address.to_string())
            .and_modify(|s| {
                s.checks += 1;
                s.last_alert_count = alert_count;
                s.last_checked = Utc::now();
            })
            .or_insert_with(|| MonitorSession {
                token_address: token_address.to_string(),
                checks: 1,
                last_alert_count: alert_count,
                last_checked: Utc::now(),
            });
    }
}

/// Run all five detectors; each positive predicate yields one trigger
fn evaluate_detectors(
    config: &AlertConfig,
    data: &AnalysisData,
    token_address: &str,
) -> Vec<AlertTrigger> {
    [
        detect_whale(config, data, token_address),
        detect_volume_spike(config, data, token_address),
        detect_rug(config, data, token_address),
        detect_new_token(config, data, token_address),
        detect_honeypot(config, data, token_address),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn detect_whale(
    config: &AlertConfig,
    data: &AnalysisData,
    token_address: &str,
) -> Option<AlertTrigger> {
    let holders = data.holder_analysis.as_ref()?;
    let whale = holders.top_holders.iter().find(|h| {
        h.percentage > WHALE_SUPPLY_PERCENT || h.amount > config.whale_threshold
    })?;

    let description = format!(
        "Whale wallet {} holds {}% of supply ({} tokens)",
        shorten_address(&whale.address, 4),
        whale.percentage,
        format_amount(whale.amount)
    );

    Some(
        AlertTrigger::new(AlertType::Whale, description, config.enabled_channels.clone())
            .with_token(token_address)
            .with_wallet(&whale.address)
            .with_amount(format_amount(whale.amount)),
    )
}

fn detect_volume_spike(
    config: &AlertConfig,
    data: &AnalysisData,
    token_address: &str,
) -> Option<AlertTrigger> {
    let volume = data.volume_analysis.as_ref()?;
    if volume.volume_change_24h <= config.volume_spike_threshold {
        return None;
    }

    let description = format!(
        "24h volume surged {:.1}x (threshold {:.1}x)",
        volume.volume_change_24h, config.volume_spike_threshold
    );

    Some(
        AlertTrigger::new(AlertType::Volume, description, config.enabled_channels.clone())
            .with_token(token_address),
    )
}

fn detect_rug(
    config: &AlertConfig,
    data: &AnalysisData,
    token_address: &str,
) -> Option<AlertTrigger> {
    let rug = data.rug_analysis.as_ref()?;
    if rug.confidence <= config.rug_pull_confidence {
        return None;
    }

    let mut description = format!("Rug-pull confidence at {:.0}%", rug.confidence);
    if !rug.reasons.is_empty() {
        description.push_str(": ");
        description.push_str(&rug.reasons.join(", "));
    }

    Some(
        AlertTrigger::new(AlertType::Rug, description, config.enabled_channels.clone())
            .with_token(token_address),
    )
}

fn detect_new_token(
    config: &AlertConfig,
    data: &AnalysisData,
    token_address: &str,
) -> Option<AlertTrigger> {
    let token = data.token_analysis.as_ref()?;
    if token.age_hours >= NEW_TOKEN_AGE_HOURS {
        return None;
    }

    let label = token
        .symbol
        .as_deref()
        .or(token.name.as_deref())
        .unwrap_or("Token");
    let description = format!("{} is only {:.1} hours old", label, token.age_hours);

    Some(
        AlertTrigger::new(AlertType::NewToken, description, config.enabled_channels.clone())
            .with_token(token_address),
    )
}

fn detect_honeypot(
    config: &AlertConfig,
    data: &AnalysisData,
    token_address: &str,
) -> Option<AlertTrigger> {
    let honeypot = data.honeypot_analysis.as_ref()?;
    if !honeypot.is_honeypot {
        return None;
    }

    let description = match &honeypot.reason {
        Some(reason) => format!("Honeypot detected - selling is blocked ({})", reason),
        None => "Honeypot detected - selling is blocked".to_string(),
    };

    Some(
        AlertTrigger::new(AlertType::Honeypot, description, config.enabled_channels.clone())
            .with_token(token_address),
    )
}

/// Shorten an opaque address for log lines: `abcd...wxyz`
///
/// Counts characters, not bytes, so arbitrary caller-supplied strings
/// never split a multi-byte character.
pub fn shorten_address(address: &str, chars: usize) -> String {
    let count = address.chars().count();
    if count <= chars * 2 {
        return address.to_string();
    }
    let head: String = address.chars().take(chars).collect();
    let tail: String = address.chars().skip(count - chars).collect();
    format!("{}...{}", head, tail)
}

/// Human-formatted token amount with thousands separators
fn format_amount(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if whole < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
