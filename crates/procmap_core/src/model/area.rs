//! Area domain model.
//!
//! # Responsibility
//! - Define the organizational grouping that owns processes.
//! - Provide the validated constructor and partial-update merge.
//!
//! # Invariants
//! - `name` is trimmed and non-empty; uniqueness across areas is enforced by
//!   the service layer and backed by the store.
//! - `id` and `created_at` survive every update unchanged.

use crate::model::clock::{next_timestamp, now_epoch_ms};
use crate::model::process::Process;
use crate::model::validation::{normalize_optional, normalize_required, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable area identifier.
pub type AreaId = Uuid;

/// Organizational grouping that owns zero or more processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: AreaId,
    /// Unique, trimmed display name.
    pub name: String,
    pub description: Option<String>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Input for creating an area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArea {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewArea {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update for an area. `None` leaves the field untouched; a blank
/// description clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Area {
    /// Builds a new area with a generated id and matching timestamps.
    pub fn new(input: NewArea) -> Result<Self, ValidationError> {
        let name = normalize_required("name", &input.name)?;
        let now = now_epoch_ms();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description: normalize_optional(input.description),
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the state this area would have after applying `patch`.
    ///
    /// `updated_at` is always refreshed, even when no field changes.
    pub fn merged(&self, patch: AreaPatch) -> Result<Self, ValidationError> {
        let name = match patch.name {
            Some(name) => normalize_required("name", &name)?,
            None => self.name.clone(),
        };
        let description = match patch.description {
            Some(description) => normalize_optional(Some(description)),
            None => self.description.clone(),
        };
        Ok(Self {
            id: self.id,
            name,
            description,
            created_at: self.created_at,
            updated_at: next_timestamp(self.updated_at),
        })
    }

    pub fn summary(&self) -> AreaSummary {
        AreaSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Compact area reference embedded in process details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSummary {
    pub id: AreaId,
    pub name: String,
    pub description: Option<String>,
}

/// Area with the number of processes it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaOverview {
    #[serde(flatten)]
    pub area: Area,
    pub process_count: u64,
}

/// Area with its full (flat) process list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaWithProcesses {
    #[serde(flatten)]
    pub area: Area,
    pub process_count: u64,
    pub processes: Vec<Process>,
}
