//! Utility modules

pub mod database;
pub mod logger;
pub mod metrics;
pub mod notifications;

pub use database::DatabaseService;
pub use logger::init_logger;
pub use metrics::MetricsService;
pub use notifications::NotificationService;
