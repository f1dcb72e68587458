//! Memewatch - meme-coin alerting suite
//!
//! Detects whale accumulation, volume spikes, rug-pull signals, freshly
//! launched tokens, and honeypots from an analysis backend, scores token
//! risk across ten weighted factors, and fans alerts out to Telegram and
//! Discord.

pub mod config;
pub mod dashboard;
pub mod modules;
pub mod utils;

pub use config::Config;
