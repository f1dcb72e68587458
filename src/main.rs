//! Memewatch - meme-coin alerting suite
//!
//! A monitoring service that:
//! - Runs tokens through five detectors (whale, volume spike, rug,
//!   new token, honeypot)
//! - Scores token risk across ten weighted factors
//! - Fans alerts out to Telegram and Discord
//!
//! This is a **monitoring-only** tool - no wallet or trading functionality.

use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use memewatch::config::Config;
use memewatch::dashboard::DashboardServer;
use memewatch::modules::alert::AlertStore;
use memewatch::modules::{AlertEngine, AnalysisExecutor, HttpAnalysisExecutor};
use memewatch::utils::notifications::AlertNotifier;
use memewatch::utils::{init_logger, DatabaseService, MetricsService, NotificationService};

const BANNER: &str = r#"
    ===============================================================
      MEMEWATCH - meme-coin alerting suite (monitor-only mode)
      whale | volume | rug | new token | honeypot
    ===============================================================
"#;

/// Memewatch application
pub struct Memewatch {
    config: Config,
    engine: Arc<AlertEngine>,
    notifications: Arc<NotificationService>,
    database: DatabaseService,
    metrics: Arc<MetricsService>,
}

impl Memewatch {
    /// Create a new Memewatch instance
    pub fn new() -> Result<Self> {
        let config = Config::from_env();

        // Initialize services
        let database = DatabaseService::new(&config.database_path)?;
        let metrics = Arc::new(MetricsService::new());
        let notifications = Arc::new(NotificationService::new(&config, Arc::clone(&metrics)));
        let executor: Arc<dyn AnalysisExecutor> =
            Arc::new(HttpAnalysisExecutor::new(config.analysis_api_url.clone()));
        let notifier: Arc<dyn AlertNotifier> = notifications.clone();
        let store = Arc::new(AlertStore::new());

        let engine = Arc::new(AlertEngine::new(
            config.alert_config(),
            executor,
            notifier,
            store,
            database.clone(),
            Arc::clone(&metrics),
        ));

        Ok(Self {
            config,
            engine,
            notifications,
            database,
            metrics,
        })
    }

    /// Start Memewatch
    pub async fn start(&self) -> Result<()> {
        println!("{}", BANNER);

        info!(target: "MEMEWATCH", "Initializing Memewatch...");
        info!(target: "MEMEWATCH", "Dashboard: http://localhost:{}", self.config.dashboard_port);

        let dashboard = DashboardServer::new(
            &self.config,
            Arc::clone(&self.engine),
            Arc::clone(&self.notifications),
            self.database.clone(),
            Arc::clone(&self.metrics),
        );

        dashboard.start().await?;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let memewatch = match Memewatch::new() {
        Ok(mw) => mw,
        Err(e) => {
            error!(target: "MEMEWATCH", "Failed to initialize: {}", e);
            return Err(e);
        }
    };

    // Setup shutdown signal handler
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    tokio::select! {
        result = memewatch.start() => {
            if let Err(e) = result {
                error!(target: "MEMEWATCH", "Fatal error: {}", e);
            }
        }
        _ = shutdown_signal => {
            info!(target: "MEMEWATCH", "Shutting down...");
        }
    }

    Ok(())
}
