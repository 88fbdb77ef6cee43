// ⚙️ Configuration - where entries live and how we log
//
// Shared by the CLI and the server binary via `#[command(flatten)]`.
// Every flag has an environment fallback.

use crate::db::SqliteStore;
use crate::registry::{PlantingRegistry, PlantingStore};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "seed_journal.db";

#[derive(Args, Debug, Clone)]
pub struct StoreConfig {
    /// SQLite database file
    #[arg(long = "db", env = "SEED_JOURNAL_DB", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Keep entries in memory only (nothing is written to disk)
    #[arg(long, env = "SEED_JOURNAL_IN_MEMORY")]
    pub in_memory: bool,
}

impl StoreConfig {
    /// Open the configured backend
    pub fn open(&self) -> Result<Box<dyn PlantingStore + Send>> {
        if self.in_memory {
            tracing::info!("using in-memory planting registry");
            return Ok(Box::new(PlantingRegistry::new()));
        }

        let store = SqliteStore::open(&self.db_path)
            .with_context(|| format!("failed to open database at {}", self.db_path.display()))?;
        tracing::info!(path = %self.db_path.display(), "using SQLite planting store");
        Ok(Box::new(store))
    }
}

#[derive(Args, Debug, Clone)]
pub struct LogConfig {
    /// Emit newline-delimited JSON log lines
    #[arg(long = "log-json", env = "SEED_JOURNAL_LOG_JSON")]
    pub json: bool,

    /// Default level when RUST_LOG is not set
    #[arg(long = "log-level", env = "SEED_JOURNAL_LOG_LEVEL", default_value = "warn")]
    pub level: tracing::Level,
}
