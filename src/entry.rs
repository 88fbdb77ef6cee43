// 🌱 Planting Entry - one recorded seed planting
//
// Identity (id) is assigned by the store and never changes.
// Every other field is a value the owner can replace with update().

use crate::error::ValidationError;
use crate::time::{days_between, Time};
use serde::{Deserialize, Serialize};

pub const MIN_LIGHT_HOURS: f64 = 0.0;
pub const MAX_LIGHT_HOURS: f64 = 24.0;

// ============================================================================
// IDENTITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlantingId(pub u64);

impl std::fmt::Display for PlantingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// DRAFT (the replaceable values)
// ============================================================================

/// Field set submitted to create/update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantingDraft {
    pub name: String,
    pub soil_type: String,
    pub seed_start_date: Time,
    pub daily_light_hours: f64,
    #[serde(default)]
    pub germination_date: Option<Time>,
}

impl PlantingDraft {
    pub fn new(
        name: impl Into<String>,
        soil_type: impl Into<String>,
        seed_start_date: Time,
        daily_light_hours: f64,
    ) -> Self {
        PlantingDraft {
            name: name.into(),
            soil_type: soil_type.into(),
            seed_start_date,
            daily_light_hours,
            germination_date: None,
        }
    }

    pub fn germinated_on(mut self, date: Time) -> Self {
        self.germination_date = Some(date);
        self
    }

    /// Check every field rule and report all violations at once
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(ValidationError::new("name", "Plant name is required"));
        }

        if self.soil_type.trim().is_empty() {
            errors.push(ValidationError::new("soil_type", "Soil type is required"));
        }

        // NaN fails both comparisons, so test the accepted range positively
        let hours = self.daily_light_hours;
        if !(MIN_LIGHT_HOURS..=MAX_LIGHT_HOURS).contains(&hours) {
            errors.push(ValidationError::new(
                "daily_light_hours",
                format!(
                    "Must be between {} and {} hours, got {}",
                    MIN_LIGHT_HOURS, MAX_LIGHT_HOURS, hours
                ),
            ));
        }

        if let Some(germinated) = self.germination_date {
            if germinated < self.seed_start_date {
                errors.push(ValidationError::new(
                    "germination_date",
                    format!(
                        "Cannot be before the seed start date ({} < {})",
                        germinated, self.seed_start_date
                    ),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantingEntry {
    pub id: PlantingId,
    pub name: String,
    pub soil_type: String,
    pub seed_start_date: Time,
    pub daily_light_hours: f64,
    pub germination_date: Option<Time>,
}

impl PlantingEntry {
    pub fn from_draft(id: PlantingId, draft: PlantingDraft) -> Self {
        PlantingEntry {
            id,
            name: draft.name,
            soil_type: draft.soil_type,
            seed_start_date: draft.seed_start_date,
            daily_light_hours: draft.daily_light_hours,
            germination_date: draft.germination_date,
        }
    }

    /// Replace every value, keeping identity
    pub fn apply(&mut self, draft: PlantingDraft) {
        *self = PlantingEntry::from_draft(self.id, draft);
    }

    /// Current values as a draft (used by callers that change only some fields)
    pub fn to_draft(&self) -> PlantingDraft {
        PlantingDraft {
            name: self.name.clone(),
            soil_type: self.soil_type.clone(),
            seed_start_date: self.seed_start_date,
            daily_light_hours: self.daily_light_hours,
            germination_date: self.germination_date,
        }
    }

    pub fn is_germinated(&self) -> bool {
        self.germination_date.is_some()
    }

    /// Whole days from planting to sprouting, if it has sprouted
    pub fn days_to_germinate(&self) -> Option<i64> {
        self.germination_date
            .map(|germinated| days_between(self.seed_start_date, germinated))
    }

    /// `name` order with `id` as tiebreak
    pub fn name_order(a: &PlantingEntry, b: &PlantingEntry) -> std::cmp::Ordering {
        a.name.cmp(&b.name).then(a.id.cmp(&b.id))
    }
}
