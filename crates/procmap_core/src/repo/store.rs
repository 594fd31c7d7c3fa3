//! Store seam pairing both repositories with an atomic-unit primitive.
//!
//! # Responsibility
//! - Hand services the area and process repositories of one backend.
//! - Run a check-then-write sequence as one all-or-nothing unit.
//!
//! # Invariants
//! - `atomically` either keeps every write made by `work` or none of them.
//! - Nested `atomically` calls join the outer unit.

use crate::repo::area_repo::{AreaRepository, SqliteAreaRepository};
use crate::repo::process_repo::{ProcessRepository, SqliteProcessRepository};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Backend that owns area and process persistence.
pub trait Store {
    type Areas: AreaRepository;
    type Processes: ProcessRepository;

    fn areas(&self) -> &Self::Areas;
    fn processes(&self) -> &Self::Processes;

    /// Runs `work` as one unit; an `Err` from `work` discards its writes.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite store over one migrated connection.
#[derive(Clone, Copy)]
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
    areas: SqliteAreaRepository<'conn>,
    processes: SqliteProcessRepository<'conn>,
}

impl<'conn> SqliteStore<'conn> {
    /// Creates store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            conn,
            areas: SqliteAreaRepository::try_new(conn)?,
            processes: SqliteProcessRepository::try_new(conn)?,
        })
    }
}

impl<'conn> Store for SqliteStore<'conn> {
    type Areas = SqliteAreaRepository<'conn>;
    type Processes = SqliteProcessRepository<'conn>;

    fn areas(&self) -> &Self::Areas {
        &self.areas
    }

    fn processes(&self) -> &Self::Processes {
        &self.processes
    }

    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        if !self.conn.is_autocommit() {
            return work();
        }

        // Dropping `tx` without commit rolls back.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let value = work()?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}
