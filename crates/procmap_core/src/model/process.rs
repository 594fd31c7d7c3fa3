//! Process domain model.
//!
//! # Responsibility
//! - Define the unit of work owned by an area and nestable under a parent.
//! - Provide the validated constructor and merged-target-state update.
//!
//! # Invariants
//! - `name` is trimmed and non-empty; `area_id` and `kind` are mandatory.
//! - When `parent_id` is set, the parent lives in the same area (checked by
//!   the service layer against the store).
//! - Processes of one area form a forest: roots have `parent_id = None`.

use crate::model::area::{AreaId, AreaSummary};
use crate::model::clock::{next_timestamp, now_epoch_ms};
use crate::model::validation::{normalize_optional, normalize_required, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable process identifier.
pub type ProcessId = Uuid;

/// How a process is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    /// Performed by people.
    Manual,
    /// Performed by, or inside, a system.
    Systemic,
}

impl ProcessType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Systemic => "systemic",
        }
    }
}

impl Display for ProcessType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "systemic" => Ok(Self::Systemic),
            _ => Err(ValidationError::InvalidValue {
                field: "type",
                value: value.to_string(),
            }),
        }
    }
}

/// Canonical process record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    pub description: Option<String>,
    /// Owning area.
    pub area_id: AreaId,
    /// Parent process in the same area. `None` means root process.
    pub parent_id: Option<ProcessId>,
    pub tools: Option<String>,
    pub responsible: Option<String>,
    pub documentation: Option<String>,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: ProcessType,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating a process.
///
/// `area_id` and `kind` are optional here so that omitting them is reported
/// as a validation failure instead of a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProcess {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub area_id: Option<AreaId>,
    #[serde(default)]
    pub parent_id: Option<ProcessId>,
    #[serde(default)]
    pub tools: Option<String>,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<ProcessType>,
}

impl NewProcess {
    /// Minimal valid input: name, area and type.
    pub fn new(name: impl Into<String>, area_id: AreaId, kind: ProcessType) -> Self {
        Self {
            name: name.into(),
            area_id: Some(area_id),
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn under(mut self, parent_id: ProcessId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tools(mut self, tools: impl Into<String>) -> Self {
        self.tools = Some(tools.into());
        self
    }

    pub fn with_responsible(mut self, responsible: impl Into<String>) -> Self {
        self.responsible = Some(responsible.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

/// Partial update for a process.
///
/// `parent_id`: `None` keeps the current parent, `Some(None)` detaches the
/// process to root level, `Some(Some(id))` re-parents it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub area_id: Option<AreaId>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<ProcessId>>,
    #[serde(default)]
    pub tools: Option<String>,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<ProcessType>,
}

// Distinguishes an explicit `null` (detach) from an absent key (keep).
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl Process {
    /// Builds a new process from create input.
    ///
    /// Checks field presence only; referential checks (area/parent existence,
    /// same-area parent) need the store and live in the service.
    pub fn new(input: NewProcess) -> Result<Self, ValidationError> {
        let name = normalize_required("name", &input.name)?;
        let area_id = input.area_id.ok_or(ValidationError::Required("areaId"))?;
        let kind = input.kind.ok_or(ValidationError::Required("type"))?;
        let now = now_epoch_ms();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description: normalize_optional(input.description),
            area_id,
            parent_id: input.parent_id,
            tools: normalize_optional(input.tools),
            responsible: normalize_optional(input.responsible),
            documentation: normalize_optional(input.documentation),
            kind,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the target state after applying `patch`.
    pub fn merged(&self, patch: ProcessPatch) -> Result<Self, ValidationError> {
        let name = match patch.name {
            Some(name) => normalize_required("name", &name)?,
            None => self.name.clone(),
        };
        Ok(Self {
            id: self.id,
            name,
            description: merge_text(&self.description, patch.description),
            area_id: patch.area_id.unwrap_or(self.area_id),
            parent_id: patch.parent_id.unwrap_or(self.parent_id),
            tools: merge_text(&self.tools, patch.tools),
            responsible: merge_text(&self.responsible, patch.responsible),
            documentation: merge_text(&self.documentation, patch.documentation),
            kind: patch.kind.unwrap_or(self.kind),
            created_at: self.created_at,
            updated_at: next_timestamp(self.updated_at),
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn summary(&self) -> ProcessSummary {
        ProcessSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

fn merge_text(current: &Option<String>, patch: Option<String>) -> Option<String> {
    match patch {
        Some(value) => normalize_optional(Some(value)),
        None => current.clone(),
    }
}

/// Compact process reference embedded in details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    pub id: ProcessId,
    pub name: String,
    pub description: Option<String>,
}

/// Process with resolved area, parent and immediate children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDetails {
    #[serde(flatten)]
    pub process: Process,
    pub area: AreaSummary,
    pub parent: Option<ProcessSummary>,
    pub children: Vec<Process>,
    pub children_count: u64,
}

/// Process with nested children, used by hierarchical listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessNode {
    #[serde(flatten)]
    pub process: Process,
    pub children: Vec<ProcessNode>,
}

impl ProcessNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ProcessNode::node_count)
            .sum::<usize>()
    }
}
