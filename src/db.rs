// 🗄️ SQLite persistence for planting entries
//
// Same operations as the in-memory registry, backed by one `plantings` table.
// Ids come from AUTOINCREMENT, so a deleted id is never handed out again.

use crate::entry::{PlantingDraft, PlantingEntry, PlantingId};
use crate::error::{RegistryError, RegistryResult};
use crate::registry::{check, PlantingStore};
use crate::time::Time;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SELECT_COLUMNS: &str =
    "SELECT id, name, soil_type, seed_start_date, daily_light_hours, germination_date
     FROM plantings";

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases report "memory")
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;

    // ==========================================================================
    // Plantings Table
    // Dates are nanoseconds since the Unix epoch
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS plantings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            soil_type TEXT NOT NULL,
            seed_start_date INTEGER NOT NULL,
            daily_light_hours REAL NOT NULL,
            germination_date INTEGER,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_plantings_name ON plantings(name, id)",
        [],
    )?;

    Ok(())
}

fn row_to_entry(row: &Row) -> rusqlite::Result<PlantingEntry> {
    let id: i64 = row.get(0)?;
    let germination: Option<i64> = row.get(5)?;

    Ok(PlantingEntry {
        id: PlantingId(id as u64),
        name: row.get(1)?,
        soil_type: row.get(2)?,
        seed_start_date: Time::from_nanos(row.get(3)?),
        daily_light_hours: row.get(4)?,
        germination_date: germination.map(Time::from_nanos),
    })
}

/// SQLite rowids are signed; an id past `i64::MAX` can never exist
fn sql_id(id: PlantingId) -> RegistryResult<i64> {
    i64::try_from(id.0).map_err(|_| RegistryError::NotFound(id))
}

// ============================================================================
// SQLITE STORE
// ============================================================================

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path`
    pub fn open(path: &Path) -> RegistryResult<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened planting database");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> RegistryResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    pub fn with_connection(conn: Connection) -> RegistryResult<Self> {
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }
}

impl PlantingStore for SqliteStore {
    fn create(&mut self, draft: PlantingDraft) -> RegistryResult<PlantingId> {
        check(&draft)?;

        self.conn.execute(
            "INSERT INTO plantings
                (name, soil_type, seed_start_date, daily_light_hours, germination_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.name,
                draft.soil_type,
                draft.seed_start_date.as_nanos(),
                draft.daily_light_hours,
                draft.germination_date.map(Time::as_nanos),
            ],
        )?;

        let id = PlantingId(self.conn.last_insert_rowid() as u64);
        tracing::info!(%id, name = %draft.name, "created planting entry");
        Ok(id)
    }

    fn get(&self, id: PlantingId) -> RegistryResult<PlantingEntry> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        self.conn
            .query_row(&sql, params![sql_id(id)?], row_to_entry)
            .optional()?
            .ok_or(RegistryError::NotFound(id))
    }

    fn list_sorted_by_name(&self) -> RegistryResult<Vec<PlantingEntry>> {
        // BINARY collation compares UTF-8 bytes, matching Rust's str ordering
        let sql = format!("{} ORDER BY name COLLATE BINARY ASC, id ASC", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;

        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn update(&mut self, id: PlantingId, draft: PlantingDraft) -> RegistryResult<()> {
        let row_id = sql_id(id)?;
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM plantings WHERE id = ?1)",
            params![row_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RegistryError::NotFound(id));
        }

        check(&draft)?;

        // Single statement: every column changes or none does
        self.conn.execute(
            "UPDATE plantings
             SET name = ?1, soil_type = ?2, seed_start_date = ?3,
                 daily_light_hours = ?4, germination_date = ?5,
                 updated_at = CURRENT_TIMESTAMP
             WHERE id = ?6",
            params![
                draft.name,
                draft.soil_type,
                draft.seed_start_date.as_nanos(),
                draft.daily_light_hours,
                draft.germination_date.map(Time::as_nanos),
                row_id,
            ],
        )?;

        tracing::info!(%id, "updated planting entry");
        Ok(())
    }

    fn delete(&mut self, id: PlantingId) -> RegistryResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM plantings WHERE id = ?1", params![sql_id(id)?])?;

        if removed == 0 {
            return Err(RegistryError::NotFound(id));
        }

        tracing::info!(%id, "deleted planting entry");
        Ok(())
    }

    fn count(&self) -> RegistryResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM plantings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn soil_types(&self) -> RegistryResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT soil_type FROM plantings ORDER BY soil_type COLLATE BINARY ASC",
        )?;

        let soils = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        // Same blank rule as the field validation (any Unicode whitespace)
        Ok(soils.into_iter().filter(|s| !s.trim().is_empty()).collect())
    }
}
