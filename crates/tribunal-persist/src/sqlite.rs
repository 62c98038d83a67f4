//! SQLite connection setup

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::error::StoreError;

/// SQLite configuration options
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database URL (e.g., "sqlite:tribunal.db?mode=rwc" or "sqlite::memory:")
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Enable WAL journal mode for better concurrency
    pub wal_mode: bool,
    /// Enable foreign key enforcement
    pub foreign_keys: bool,
    /// Busy timeout in seconds
    pub busy_timeout_secs: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:tribunal.db?mode=rwc".to_string(),
            max_connections: 5,
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_secs: 30,
        }
    }
}

impl SqliteConfig {
    /// Create config for in-memory database (testing)
    ///
    /// A single connection is used: every pooled connection to
    /// `sqlite::memory:` would otherwise see its own empty database.
    pub fn memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            wal_mode: false,
            foreign_keys: true,
            busy_timeout_secs: 5,
        }
    }

    /// File-backed config for `url`
    pub fn file(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    /// Config from `TRIBUNAL_DATABASE_URL`, falling back to the default file
    pub fn from_env() -> Self {
        match std::env::var("TRIBUNAL_DATABASE_URL") {
            Ok(url) => Self::file(&url),
            Err(_) => Self::default(),
        }
    }

    pub fn is_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// Open a pool for `config` and bring the schema up to date
pub async fn connect(config: &SqliteConfig) -> Result<SqlitePool, StoreError> {
    let mut options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    if config.foreign_keys {
        options = options.pragma("foreign_keys", "ON");
    }
    options = options.pragma("busy_timeout", (config.busy_timeout_secs * 1000).to_string());
    if config.wal_mode {
        options = options.pragma("journal_mode", "WAL");
    }

    let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.is_memory() {
        // Closing the only connection would drop the database
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    info!(url = %config.url, wal = config.wal_mode, "Connected to SQLite");

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_connect_runs_migrations() {
        let pool = connect(&SqliteConfig::memory()).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();

        for expected in ["challenges", "debate_outcomes", "persona_accuracy", "persona_votes"] {
            assert!(names.contains(&expected), "missing table {}", expected);
        }
    }

    #[test]
    fn test_memory_detection() {
        assert!(SqliteConfig::memory().is_memory());
        assert!(!SqliteConfig::default().is_memory());
    }
}
