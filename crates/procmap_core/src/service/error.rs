//! Service-level error taxonomy.
//!
//! # Invariants
//! - Every business-rule failure maps to exactly one `ErrorKind`.
//! - Storage constraint rejections surface as `Conflict`, never as
//!   `Persistence`.

use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Coarse error class used at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Persistence,
}

impl ErrorKind {
    /// HTTP status an outer layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Persistence => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Persistence => "persistence",
        }
    }
}

/// Entity addressed by a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Area,
    Process,
    ParentProcess,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Area => f.write_str("area"),
            Self::Process => f.write_str("process"),
            Self::ParentProcess => f.write_str("parent process"),
        }
    }
}

/// Reason a write was refused because of existing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    DuplicateAreaName(String),
    AreaHasProcesses { area_id: Uuid, processes: u64 },
    ProcessHasChildren { process_id: Uuid, children: u64 },
    /// Storage backstop fired after the service checks passed.
    Constraint(String),
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateAreaName(_) => f.write_str("area with this name already exists"),
            Self::AreaHasProcesses { .. } => {
                f.write_str("cannot delete area with existing processes")
            }
            Self::ProcessHasChildren { .. } => {
                f.write_str("cannot delete process with existing child processes")
            }
            Self::Constraint(detail) => write!(f, "conflicting state: {detail}"),
        }
    }
}

/// Errors returned by area and process services.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    NotFound { entity: Entity, id: Uuid },
    Conflict(Conflict),
    Persistence(RepoError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub(crate) fn not_found(entity: Entity, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, .. } => write!(f, "{entity} not found"),
            Self::Conflict(conflict) => write!(f, "{conflict}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::UniqueViolation(detail) | RepoError::ForeignKeyViolation(detail) => {
                Self::Conflict(Conflict::Constraint(detail))
            }
            other => Self::Persistence(other),
        }
    }
}
