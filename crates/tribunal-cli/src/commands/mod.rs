//! Subcommand implementations

pub mod debates;
pub mod info;
pub mod mode;
pub mod weights;

use anyhow::{Context, Result};
use tracing::debug;
use tribunal_persist::{SqliteAccuracyStore, SqliteConfig};

/// Open (and migrate) the store behind `database`
pub async fn open_store(database: &str) -> Result<SqliteAccuracyStore> {
    let config = if database.contains(":memory:") {
        SqliteConfig::memory()
    } else {
        SqliteConfig::file(database)
    };
    debug!(url = %config.url, max_connections = config.max_connections, "Opening store");
    SqliteAccuracyStore::connect(&config)
        .await
        .with_context(|| format!("Failed to open database {}", database))
}
