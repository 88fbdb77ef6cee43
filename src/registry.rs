// 📒 Planting Registry - owns entries and their identity
//
// `PlantingStore` is the operation set every backend provides.
// `PlantingRegistry` is the in-memory backend; `db::SqliteStore` persists.
//
// Listing order: `name` ascending, compared byte-wise (case-sensitive,
// "Zinnia" < "arugula"), ties broken by `id` ascending.

use crate::entry::{PlantingDraft, PlantingEntry, PlantingId};
use crate::error::{RegistryError, RegistryResult};
use std::collections::BTreeMap;

// ============================================================================
// STORE TRAIT
// ============================================================================

pub trait PlantingStore {
    /// Validate `draft`, assign a fresh id, store it
    fn create(&mut self, draft: PlantingDraft) -> RegistryResult<PlantingId>;

    fn get(&self, id: PlantingId) -> RegistryResult<PlantingEntry>;

    fn list_sorted_by_name(&self) -> RegistryResult<Vec<PlantingEntry>>;

    /// Replace every value of `id` with `draft`, all or nothing
    fn update(&mut self, id: PlantingId, draft: PlantingDraft) -> RegistryResult<()>;

    /// Remove permanently
    fn delete(&mut self, id: PlantingId) -> RegistryResult<()>;

    fn count(&self) -> RegistryResult<usize> {
        Ok(self.list_sorted_by_name()?.len())
    }

    /// Distinct, non-blank soil types in ascending order
    fn soil_types(&self) -> RegistryResult<Vec<String>> {
        let mut soils: Vec<String> = self
            .list_sorted_by_name()?
            .into_iter()
            .map(|e| e.soil_type)
            .filter(|s| !s.trim().is_empty())
            .collect();
        soils.sort();
        soils.dedup();
        Ok(soils)
    }

    /// Entries whose soil type equals `soil_type` exactly, in name order
    fn list_by_soil_type(&self, soil_type: &str) -> RegistryResult<Vec<PlantingEntry>> {
        Ok(self
            .list_sorted_by_name()?
            .into_iter()
            .filter(|e| e.soil_type == soil_type)
            .collect())
    }
}

/// Run the field rules, turning failures into `RegistryError::Validation`
pub(crate) fn check(draft: &PlantingDraft) -> RegistryResult<()> {
    draft.validate().map_err(|errors| {
        tracing::warn!(count = errors.len(), "rejected planting draft");
        RegistryError::Validation(errors)
    })
}

// ============================================================================
// ID SEQUENCE
// ============================================================================

/// Hands out ids 1, 2, 3, ... and never repeats one, even after deletes
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        IdSequence { next: 1 }
    }

    pub fn next_id(&mut self) -> PlantingId {
        let id = PlantingId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// IN-MEMORY REGISTRY
// ============================================================================

#[derive(Debug, Default)]
pub struct PlantingRegistry {
    entries: BTreeMap<PlantingId, PlantingEntry>,
    ids: IdSequence,
}

impl PlantingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PlantingStore for PlantingRegistry {
    fn create(&mut self, draft: PlantingDraft) -> RegistryResult<PlantingId> {
        check(&draft)?;

        let id = self.ids.next_id();
        tracing::info!(%id, name = %draft.name, "created planting entry");
        self.entries.insert(id, PlantingEntry::from_draft(id, draft));
        Ok(id)
    }

    fn get(&self, id: PlantingId) -> RegistryResult<PlantingEntry> {
        self.entries
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    fn list_sorted_by_name(&self) -> RegistryResult<Vec<PlantingEntry>> {
        // BTreeMap iterates by id, so a stable sort on name keeps the id tiebreak
        let mut entries: Vec<PlantingEntry> = self.entries.values().cloned().collect();
        entries.sort_by(PlantingEntry::name_order);
        Ok(entries)
    }

    fn update(&mut self, id: PlantingId, draft: PlantingDraft) -> RegistryResult<()> {
        let entry = self.entries.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        check(&draft)?;

        entry.apply(draft);
        tracing::info!(%id, "updated planting entry");
        Ok(())
    }

    fn delete(&mut self, id: PlantingId) -> RegistryResult<()> {
        self.entries.remove(&id).ok_or(RegistryError::NotFound(id))?;
        tracing::info!(%id, "deleted planting entry");
        Ok(())
    }

    fn count(&self) -> RegistryResult<usize> {
        Ok(self.entries.len())
    }
}

// ============================================================================
// TESTS
// ============================================================================
