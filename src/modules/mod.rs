//! Memewatch alerting modules

pub mod alert;
pub mod alert_engine;
pub mod analysis;
pub mod risk_scorer;

pub use alert::{AlertConfig, AlertStore, AlertTrigger};
pub use alert_engine::AlertEngine;
pub use analysis::{AnalysisExecutor, HttpAnalysisExecutor};
pub use risk_scorer::calculate_risk_score;
