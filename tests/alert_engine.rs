//! End-to-end alert engine tests against the public API
//!
//! The analysis executor and the notifier are replaced by in-process
//! doubles; no network is involved.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use memewatch::modules::alert::{
    AlertConfig, AlertConfigUpdate, AlertPriority, AlertStore, AlertTrigger, AlertType, Channel,
};
use memewatch::modules::alert_engine::AlertEngine;
use memewatch::modules::analysis::{
    AnalysisData, AnalysisError, AnalysisExecutor, AnalysisResponse, HolderAnalysis, TopHolder,
};
use memewatch::utils::notifications::AlertNotifier;
use memewatch::utils::{DatabaseService, MetricsService};

/// Canned executor responses
enum Script {
    Respond(AnalysisResponse),
    FailUpstream,
}

struct MockExecutor {
    script: Mutex<Script>,
}

impl MockExecutor {
    fn respond(data: AnalysisData) -> Self {
        Self {
            script: Mutex::new(Script::Respond(AnalysisResponse {
                success: true,
                data,
                error: None,
            })),
        }
    }

    fn unsuccessful() -> Self {
        Self {
            script: Mutex::new(Script::Respond(AnalysisResponse {
                success: false,
                data: AnalysisData::default(),
                error: Some("model unavailable".to_string()),
            })),
        }
    }

    fn failing() -> Self {
        Self {
            script: Mutex::new(Script::FailUpstream),
        }
    }
}

#[async_trait]
impl AnalysisExecutor for MockExecutor {
    async fn analyze(&self, _intent: &str) -> Result<AnalysisResponse, AnalysisError> {
        match &*self.script.lock() {
            Script::Respond(response) => Ok(response.clone()),
            Script::FailUpstream => Err(AnalysisError::Upstream(Some("boom".to_string()))),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    delivered: Mutex<Vec<AlertTrigger>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<AlertTrigger> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl AlertNotifier for RecordingNotifier {
    async fn send_alert(&self, alert: &AlertTrigger) -> bool {
        self.delivered.lock().push(alert.clone());
        true
    }
}

fn default_config() -> AlertConfig {
    AlertConfig {
        whale_threshold: 10_000.0,
        volume_spike_threshold: 5.0,
        rug_pull_confidence: 70.0,
        enabled_channels: [Channel::Telegram, Channel::Discord].into_iter().collect(),
        auto_analysis: true,
        notifications_enabled: true,
    }
}

fn build_engine(
    config: AlertConfig,
    executor: MockExecutor,
) -> (Arc<AlertEngine>, Arc<RecordingNotifier>, Arc<AlertStore>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let notifier_dyn: Arc<dyn AlertNotifier> = notifier.clone();
    let store = Arc::new(AlertStore::new());
    let engine = Arc::new(AlertEngine::new(
        config,
        Arc::new(executor),
        notifier_dyn,
        Arc::clone(&store),
        DatabaseService::in_memory().unwrap(),
        Arc::new(MetricsService::new()),
    ));
    (engine, notifier, store)
}

fn whale_payload() -> AnalysisData {
    AnalysisData {
        holder_analysis: Some(HolderAnalysis {
            top_holders: vec![TopHolder {
                address: "Addr1".to_string(),
                percentage: 8.0,
                amount: 5_000.0,
            }],
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn unsuccessful_analysis_yields_no_alerts_and_no_notifications() {
    let (engine, notifier, store) = build_engine(default_config(), MockExecutor::unsuccessful());

    let alerts = engine.monitor_token("Mint1").await;

    assert!(alerts.is_empty());
    assert!(notifier.sent().is_empty());
    assert!(store.is_empty());
    assert_eq!(engine.get_stats().alerts_triggered, 0);
}

#[tokio::test]
async fn executor_error_degrades_to_empty_result() {
    let (engine, notifier, _) = build_engine(default_config(), MockExecutor::failing());

    let alerts = engine.monitor_token("Mint1").await;

    assert!(alerts.is_empty());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn whale_payload_triggers_one_high_priority_alert() {
    let (engine, notifier, store) =
        build_engine(default_config(), MockExecutor::respond(whale_payload()));

    let alerts = engine.monitor_token("Mint1").await;

    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.alert_type, AlertType::Whale);
    assert_eq!(alert.priority, AlertPriority::High);
    assert!(alert.description.contains("8% of supply"));
    assert_eq!(alert.token_address.as_deref(), Some("Mint1"));
    assert_eq!(alert.channels.len(), 2);

    // Stored, notified, and counted
    assert_eq!(store.len(), 1);
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(notifier.sent()[0].id, alert.id);

    let stats = engine.get_stats();
    assert_eq!(stats.tokens_monitored, 1);
    assert_eq!(stats.alerts_triggered, 1);
    assert_eq!(stats.notifications_delivered, 1);
}

#[tokio::test]
async fn disabling_notifications_still_stores_alerts() {
    let mut config = default_config();
    config.notifications_enabled = false;
    let (engine, notifier, store) =
        build_engine(config, MockExecutor::respond(whale_payload()));

    let alerts = engine.monitor_token("Mint1").await;

    assert_eq!(alerts.len(), 1);
    assert_eq!(store.len(), 1);
    assert!(notifier.sent().is_empty());
    assert_eq!(engine.get_stats().notifications_delivered, 0);
}

#[tokio::test]
async fn read_and_star_mutations_go_through_the_engine() {
    let (engine, _, _) = build_engine(default_config(), MockExecutor::respond(whale_payload()));

    let alerts = engine.monitor_token("Mint1").await;
    let id = alerts[0].id.clone();

    assert!(engine.mark_as_read(&id));
    assert!(engine.recent_alerts(1)[0].is_read);

    assert_eq!(engine.toggle_star(&id), Some(true));
    assert_eq!(engine.toggle_star(&id), Some(false));
    assert!(!engine.recent_alerts(1)[0].is_starred);

    assert!(!engine.mark_as_read("whale-0"));
    assert_eq!(engine.toggle_star("whale-0"), None);
}

#[tokio::test]
async fn config_update_changes_detection_behavior() {
    // Holder is under the 5% supply rule but over the default absolute
    // threshold
    let payload = AnalysisData {
        holder_analysis: Some(HolderAnalysis {
            top_holders: vec![TopHolder {
                address: "Addr1".to_string(),
                percentage: 2.0,
                amount: 25_000.0,
            }],
        }),
        ..Default::default()
    };
    let (engine, _, _) = build_engine(default_config(), MockExecutor::respond(payload));

    assert_eq!(engine.monitor_token("Mint1").await.len(), 1);

    // Raising the threshold silences the detector
    engine.update_config(AlertConfigUpdate {
        whale_threshold: Some(100_000.0),
        ..Default::default()
    });
    assert_eq!(engine.get_config().whale_threshold, 100_000.0);
    assert!(engine.monitor_token("Mint1").await.is_empty());
}

#[tokio::test]
async fn sessions_accumulate_per_token() {
    let (engine, _, _) = build_engine(default_config(), MockExecutor::respond(whale_payload()));

    engine.monitor_token("Mint1").await;
    engine.monitor_token("Mint1").await;
    engine.monitor_token("Mint2").await;

    let sessions = engine.sessions();
    assert_eq!(sessions.len(), 2);

    let mint1 = sessions
        .iter()
        .find(|s| s.token_address == "Mint1")
        .unwrap();
    assert_eq!(mint1.checks, 2);
    assert_eq!(mint1.last_alert_count, 1);
}

#[tokio::test]
async fn broadcast_subscribers_see_new_triggers() {
    let (engine, _, _) = build_engine(default_config(), MockExecutor::respond(whale_payload()));

    let mut rx = engine.subscribe();
    let alerts = engine.monitor_token("Mint1").await;

    let received = rx.recv().await.unwrap();
    assert_eq!(received.id, alerts[0].id);
}
