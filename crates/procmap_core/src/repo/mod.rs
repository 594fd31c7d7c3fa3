//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for areas and processes.
//! - Provide two interchangeable implementations: SQLite and in-memory.
//! - Isolate SQL details from service/business orchestration.
//!
//! # Invariants
//! - Repositories store what they are given; business rules live in
//!   `service`. The only rules enforced here are storage backstops: unique
//!   area names and referential integrity.
//! - Mutations addressing a missing id return `RepoError::NotFound`.

use crate::db::DbError;
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod area_repo;
pub mod memory_repo;
pub mod process_repo;
mod sql;
pub mod store;

const FOREIGN_KEY_FAILED: &str = "FOREIGN KEY constraint failed";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by all repository implementations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Addressed row does not exist.
    NotFound(Uuid),
    /// Storage-level unique constraint rejected the write.
    UniqueViolation(String),
    /// Storage-level referential constraint rejected the write.
    ForeignKeyViolation(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::UniqueViolation(detail) => write!(f, "unique constraint violated: {detail}"),
            Self::ForeignKeyViolation(detail) => {
                write!(f, "referential constraint violated: {detail}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            let detail = message
                .clone()
                .unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return Self::UniqueViolation(detail);
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::ForeignKeyViolation(detail),
                // `ON DELETE RESTRICT` fires as a trigger constraint.
                ffi::SQLITE_CONSTRAINT_TRIGGER if detail.contains(FOREIGN_KEY_FAILED) => {
                    return Self::ForeignKeyViolation(detail);
                }
                _ => {}
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// One page of records plus the total matching the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub total_items: u64,
}

#[cfg(test)]
mod tests {
    use super::RepoError;
    use rusqlite::ffi;

    fn sqlite_failure(extended_code: i32, message: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            ffi::Error::new(extended_code),
            Some(message.to_string()),
        )
    }

    #[test]
    fn restrict_trigger_maps_to_foreign_key_violation() {
        let err = RepoError::from(sqlite_failure(
            ffi::SQLITE_CONSTRAINT_TRIGGER,
            "FOREIGN KEY constraint failed",
        ));
        assert!(matches!(err, RepoError::ForeignKeyViolation(_)));
    }

    #[test]
    fn other_trigger_failures_stay_db_errors() {
        let err = RepoError::from(sqlite_failure(
            ffi::SQLITE_CONSTRAINT_TRIGGER,
            "custom trigger aborted",
        ));
        assert!(matches!(err, RepoError::Db(_)));
    }

    #[test]
    fn unique_failure_maps_to_unique_violation() {
        let err = RepoError::from(sqlite_failure(
            ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: areas.name",
        ));
        assert!(matches!(err, RepoError::UniqueViolation(_)));
    }
}
