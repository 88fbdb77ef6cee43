// ⚠️ Error taxonomy for the planting registry
//
// Two caller-visible kinds: a draft that breaks a field rule, and an id the
// registry does not know. Storage failures only come from the SQLite backend.

use crate::entry::PlantingId;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// FIELD-LEVEL VALIDATION ERROR
// ============================================================================

/// One broken field rule, e.g. `daily_light_hours: must be between 0 and 24`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// REGISTRY ERROR
// ============================================================================

/// Errors returned by every `PlantingStore` operation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// At least one field rule was broken; nothing was stored.
    #[error("invalid planting entry: {}", describe(.0))]
    Validation(Vec<ValidationError>),

    #[error("planting entry not found: {0}")]
    NotFound(PlantingId),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl RegistryError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RegistryError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }

    /// Field errors, empty for every other kind
    pub fn field_errors(&self) -> &[ValidationError] {
        match self {
            RegistryError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
