//! Core domain logic for the process map.
//! This crate is the single source of truth for area/process business rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod query;
pub mod repo;
pub mod seed;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::area::{
    Area, AreaId, AreaOverview, AreaPatch, AreaSummary, AreaWithProcesses, NewArea,
};
pub use model::process::{
    NewProcess, Process, ProcessDetails, ProcessId, ProcessNode, ProcessPatch, ProcessSummary,
    ProcessType,
};
pub use model::validation::ValidationError;
pub use pagination::{calculate_meta, PageRequest, Paginated, PaginationMeta, SortOrder};
pub use query::{
    AreaQuery, AreaSortField, ListParams, ParentFilter, ProcessQuery, ProcessSortField,
};
pub use repo::area_repo::{AreaRepository, SqliteAreaRepository};
pub use repo::memory_repo::MemoryStore;
pub use repo::process_repo::{ProcessRepository, SqliteProcessRepository};
pub use repo::store::{SqliteStore, Store};
pub use repo::{PageSlice, RepoError, RepoResult};
pub use seed::seed_demo_data;
pub use service::area_service::AreaService;
pub use service::error::{Conflict, Entity, ErrorKind, ServiceError, ServiceResult};
pub use service::process_service::ProcessService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
