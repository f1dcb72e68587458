//! Dashboard server module

pub mod server;

pub use server::DashboardServer;
