// Seed Journal - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod db;
pub mod entry;
pub mod error;
pub mod registry;
pub mod telemetry;
pub mod time;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use db::{setup_database, SqliteStore};
pub use entry::{PlantingDraft, PlantingEntry, PlantingId, MAX_LIGHT_HOURS, MIN_LIGHT_HOURS};
pub use error::{RegistryError, RegistryResult, ValidationError};
pub use registry::{IdSequence, PlantingRegistry, PlantingStore};
pub use time::{days_between, Time, TimeError, NANOS_PER_DAY};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
