//! # Tribunal Persist
//!
//! Durable track record for debate personas.
//!
//! - [`AccuracyStore`]: async, object-safe store trait
//! - [`SqliteAccuracyStore`]: SQLite implementation with embedded migrations
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), tribunal_persist::StoreError> {
//! use tribunal_persist::{AccuracyStore, SqliteAccuracyStore, SqliteConfig};
//!
//! let store = SqliteAccuracyStore::connect(&SqliteConfig::from_env()).await?;
//! let weight = store.get_persona_weight("value_investor", 10).await?;
//! assert!((0.1..=1.0).contains(&weight));
//! # Ok(())
//! # }
//! ```

pub mod accuracy_store;
pub mod error;
pub mod sqlite;

pub use accuracy_store::{AccuracyStore, SqliteAccuracyStore};
pub use error::StoreError;
pub use sqlite::{connect, SqliteConfig};
