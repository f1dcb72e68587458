//! Prometheus metrics service for Memewatch

use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder,
};
use std::time::Instant;
use tracing::info;

/// Metrics service for Prometheus
pub struct MetricsService {
    registry: Registry,
    start_time: Instant,

    // Engine metrics
    pub tokens_monitored: Counter,
    pub alerts_triggered: CounterVec,
    pub stored_alerts: Gauge,

    // Notification metrics
    pub notifications_sent: CounterVec,

    // System metrics
    pub uptime: Gauge,
}

impl MetricsService {
    /// Create a new metrics service
    pub fn new() -> Self {
        let registry = Registry::new();

        let tokens_monitored = Counter::new(
            "memewatch_tokens_monitored_total",
            "Tokens run through the alert pipeline",
        )
        .unwrap();
        let alerts_triggered = CounterVec::new(
            Opts::new("memewatch_alerts_triggered_total", "Alerts triggered"),
            &["type"],
        )
        .unwrap();
        let stored_alerts = Gauge::new(
            "memewatch_stored_alerts",
            "Alerts currently held in the in-memory store",
        )
        .unwrap();
        let notifications_sent = CounterVec::new(
            Opts::new("memewatch_notifications_sent_total", "Notification dispatches"),
            &["channel", "outcome"],
        )
        .unwrap();
        let uptime = Gauge::new("memewatch_uptime_seconds", "Application uptime").unwrap();

        registry.register(Box::new(tokens_monitored.clone())).unwrap();
        registry.register(Box::new(alerts_triggered.clone())).unwrap();
        registry.register(Box::new(stored_alerts.clone())).unwrap();
        registry.register(Box::new(notifications_sent.clone())).unwrap();
        registry.register(Box::new(uptime.clone())).unwrap();

        info!(target: "METRICS", "Prometheus metrics initialized");

        Self {
            registry,
            start_time: Instant::now(),
            tokens_monitored,
            alerts_triggered,
            stored_alerts,
            notifications_sent,
            uptime,
        }
    }

    /// Record an alert being triggered
    pub fn record_alert(&self, alert_type: &str) {
        self.alerts_triggered.with_label_values(&[alert_type]).inc();
    }

    /// Record a notification dispatch outcome for one channel
    pub fn record_notification(&self, channel: &str, delivered: bool) {
        let outcome = if delivered { "delivered" } else { "failed" };
        self.notifications_sent
            .with_label_values(&[channel, outcome])
            .inc();
    }

    /// Get metrics as Prometheus text format
    pub fn get_metrics(&self) -> String {
        self.uptime.set(self.start_time.elapsed().as_secs_f64());

        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }
}

impl Default for MetricsService {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MetricsService {
    fn clone(&self) -> Self {
        // Prometheus metrics are thread-safe handles onto shared state
        Self {
            registry: self.registry.clone(),
            start_time: self.start_time,
            tokens_monitored: self.tokens_monitored.clone(),
            alerts_triggered: self.alerts_triggered.clone(),
            stored_alerts: self.stored_alerts.clone(),
            notifications_sent: self.notifications_sent.clone(),
            uptime: self.uptime.clone(),
        }
    }
}
