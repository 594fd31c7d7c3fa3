//! Input and invariant validation errors.

use crate::model::area::AreaId;
use crate::model::process::ProcessId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rule violation detected before any store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is absent or blank after trimming.
    Required(&'static str),
    /// Field value cannot be interpreted.
    InvalidValue { field: &'static str, value: String },
    /// Parent process belongs to another area than its child.
    ParentInDifferentArea {
        parent_id: ProcessId,
        area_id: AreaId,
    },
    /// Process cannot be its own parent.
    SelfParent(ProcessId),
    /// Candidate parent is a descendant of the process being re-parented.
    Cycle {
        process_id: ProcessId,
        parent_id: ProcessId,
    },
    /// A process with children cannot switch areas; its children would be
    /// left under a parent in a foreign area.
    AreaChangeWithChildren {
        process_id: ProcessId,
        children: u64,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "{field} is required"),
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value `{value}` for {field}")
            }
            Self::ParentInDifferentArea { parent_id, area_id } => write!(
                f,
                "parent process must be in the same area: parent {parent_id} is not in area {area_id}"
            ),
            Self::SelfParent(id) => write!(f, "process cannot be its own parent: {id}"),
            Self::Cycle {
                process_id,
                parent_id,
            } => write!(
                f,
                "parent assignment would create a cycle: process {process_id} under {parent_id}"
            ),
            Self::AreaChangeWithChildren {
                process_id,
                children,
            } => write!(
                f,
                "cannot move process {process_id} to another area while it has {children} child process(es)"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Trims a required text field, rejecting blank values.
pub fn normalize_required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field; blank input is stored as absent.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{normalize_optional, normalize_required, ValidationError};

    #[test]
    fn required_field_is_trimmed() {
        assert_eq!(normalize_required("name", "  RH ").unwrap(), "RH");
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let err = normalize_required("name", " \t ").unwrap_err();
        assert_eq!(err, ValidationError::Required("name"));
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn blank_optional_field_becomes_none() {
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" Jira ".to_string())).as_deref(),
            Some("Jira")
        );
        assert_eq!(normalize_optional(None), None);
    }
}
