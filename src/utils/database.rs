//! SQLite alert history for Memewatch
//!
//! The in-memory store enforces the 100-entry window; this table is the
//! durable history behind it.

use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::modules::alert::AlertTrigger;

/// Alert row as persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub id: String,
    pub alert_type: String,
    pub priority: String,
    pub token_address: Option<String>,
    pub wallet_address: Option<String>,
    pub amount: Option<String>,
    pub description: String,
    pub channels: String,
    pub is_read: bool,
    pub is_starred: bool,
    pub created_at: String,
}

/// SQLite database service
pub struct DatabaseService {
    conn: Arc<Mutex<Connection>>,
}

impl DatabaseService {
    /// Open (or create) the database at the given path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        let service = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        service.initialize()?;
        Ok(service)
    }

    /// In-memory database, used by tests
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let service = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        service.initialize()?;
        Ok(service)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id TEXT PRIMARY KEY,
                type TEXT NOT NULL,
                priority TEXT NOT NULL,
                token_address TEXT,
                wallet_address TEXT,
                amount TEXT,
                description TEXT NOT NULL,
                channels TEXT NOT NULL,
                is_read INTEGER DEFAULT 0,
                is_starred INTEGER DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_alerts_created ON alerts(created_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_alerts_token ON alerts(token_address)",
            [],
        )?;

        info!(target: "DATABASE", "Initialized successfully");
        Ok(())
    }

    pub fn save_alert(&self, alert: &AlertTrigger) -> Result<()> {
        let channels = alert
            .channels
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO alerts
            (id, type, priority, token_address, wallet_address, amount,
             description, channels, is_read, is_starred, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                alert.id,
                alert.alert_type.as_str(),
                alert.priority.as_str(),
                alert.token_address,
                alert.wallet_address,
                alert.amount,
                alert.description,
                channels,
                alert.is_read as i32,
                alert.is_starred as i32,
                alert.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn mark_as_read(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("UPDATE alerts SET is_read = 1 WHERE id = ?", params![id])?;
        Ok(())
    }

    pub fn set_starred(&self, id: &str, starred: bool) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE alerts SET is_starred = ? WHERE id = ?",
            params![starred as i32, id],
        )?;
        Ok(())
    }

    pub fn get_recent_alerts(&self, limit: i64) -> Result<Vec<AlertRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, type, priority, token_address, wallet_address, amount,
                    description, channels, is_read, is_starred, created_at
             FROM alerts ORDER BY created_at DESC LIMIT ?",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(AlertRecord {
                id: row.get(0)?,
                alert_type: row.get(1)?,
                priority: row.get(2)?,
                token_address: row.get(3)?,
                wallet_address: row.get(4)?,
                amount: row.get(5)?,
                description: row.get(6)?,
                channels: row.get(7)?,
                is_read: row.get::<_, i32>(8)? != 0,
                is_starred: row.get::<_, i32>(9)? != 0,
                created_at: row.get(10)?,
            })
        })?;

        let mut alerts = Vec::new();
        for row in rows {
            alerts.push(row?);
        }
        Ok(alerts)
    }

    pub fn count_alerts(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn.query_row("SELECT COUNT(*) FROM alerts", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Housekeeping for long-running deployments
    pub fn prune_older_than(&self, days: i64) -> Result<usize> {
        let cutoff = (Utc::now() - chrono::Duration::days(days)).to_rfc3339();
        let conn = self.conn.lock();
        let removed = conn.execute(
            "DELETE FROM alerts WHERE created_at < ? AND is_starred = 0",
            params![cutoff],
        )?;
        Ok(removed)
    }
}

impl Clone for DatabaseService {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::alert::{AlertType, Channel};
    use std::collections::HashSet;

    fn sample_alert(id: &str) -> AlertTrigger {
        let channels: HashSet<Channel> = [Channel::Telegram].into_iter().collect();
        let mut alert = AlertTrigger::new(
            AlertType::Rug,
            "Rug-pull confidence at 85%".to_string(),
            channels,
        )
        .with_token("TokenMint111");
        alert.id = id.to_string();
        alert
    }

    #[test]
    fn round_trips_alert_rows() {
        let db = DatabaseService::in_memory().unwrap();
        db.save_alert(&sample_alert("rug-1")).unwrap();
        db.save_alert(&sample_alert("rug-2")).unwrap();

        let rows = db.get_recent_alerts(10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].alert_type, "rug");
        assert_eq!(rows[0].priority, "high");
        assert_eq!(rows[0].channels, "telegram");
        assert_eq!(db.count_alerts().unwrap(), 2);
    }

    #[test]
    fn mirrors_read_and_star_mutations() {
        let db = DatabaseService::in_memory().unwrap();
        db.save_alert(&sample_alert("rug-1")).unwrap();

        db.mark_as_read("rug-1").unwrap();
        db.set_starred("rug-1", true).unwrap();

        let rows = db.get_recent_alerts(1).unwrap();
        assert!(rows[0].is_read);
        assert!(rows[0].is_starred);
    }

    #[test]
    fn prune_keeps_starred_rows() {
        let db = DatabaseService::in_memory().unwrap();
        let mut old = sample_alert("rug-old");
        old.timestamp = Utc::now() - chrono::Duration::days(60);
        let mut starred = sample_alert("rug-starred");
        starred.timestamp = Utc::now() - chrono::Duration::days(60);
        starred.is_starred = true;

        db.save_alert(&old).unwrap();
        db.save_alert(&starred).unwrap();

        let removed = db.prune_older_than(30).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(db.count_alerts().unwrap(), 1);
    }
}
