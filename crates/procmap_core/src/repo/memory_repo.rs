//! In-memory store used by tests and ephemeral sessions.
//!
//! # Responsibility
//! - Implement both repository contracts without SQLite.
//! - Mirror the SQLite backstops: unique area names, restrict-on-delete
//!   references, and existing `area_id`/`parent_id` targets.
//!
//! # Invariants
//! - Listing order and filter semantics match the SQLite implementation,
//!   including the `id ASC` tiebreak and Unicode case-insensitive search.
//! - `atomically` holds the state lock for the whole unit; other clones
//!   block until it ends, and a failed unit restores its snapshot.

use crate::db::fold_case;
use crate::model::area::{Area, AreaId};
use crate::model::process::{Process, ProcessId};
use crate::pagination::{PageRequest, SortOrder};
use crate::query::{AreaQuery, AreaSortField, ParentFilter, ProcessQuery, ProcessSortField};
use crate::repo::area_repo::AreaRepository;
use crate::repo::process_repo::ProcessRepository;
use crate::repo::store::Store;
use crate::repo::{PageSlice, RepoError, RepoResult};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    areas: HashMap<AreaId, Area>,
    processes: HashMap<ProcessId, Process>,
}

/// Shared-state store; clones see the same data.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    // Reentrant so repository calls inside `atomically` relock on the
    // owning thread. `RefCell` borrows never outlive one repository call.
    state: Arc<ReentrantMutex<RefCell<MemoryState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ReentrantMutex::new(RefCell::new(MemoryState::default()))),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&MemoryState) -> R) -> R {
        let guard = self.state.lock();
        let state = guard.borrow();
        f(&state)
    }

    fn write<R>(&self, f: impl FnOnce(&mut MemoryState) -> R) -> R {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    type Areas = Self;
    type Processes = Self;

    fn areas(&self) -> &Self::Areas {
        self
    }

    fn processes(&self) -> &Self::Processes {
        self
    }

    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        let unit = self.state.lock();
        let snapshot = unit.borrow().clone();
        let result = work();
        if result.is_err() {
            *unit.borrow_mut() = snapshot;
        }
        result
    }
}

impl AreaRepository for MemoryStore {
    fn insert_area(&self, area: &Area) -> RepoResult<()> {
        self.write(|state| {
            if state.areas.contains_key(&area.id) {
                return Err(RepoError::UniqueViolation(format!("areas.id {}", area.id)));
            }
            ensure_unique_name(state, area)?;
            state.areas.insert(area.id, area.clone());
            Ok(())
        })
    }

    fn get_area(&self, id: AreaId) -> RepoResult<Option<Area>> {
        Ok(self.read(|state| state.areas.get(&id).cloned()))
    }

    fn find_area_by_name(&self, name: &str) -> RepoResult<Option<Area>> {
        Ok(self.read(|state| {
            state
                .areas
                .values()
                .find(|area| area.name == name)
                .cloned()
        }))
    }

    fn list_areas(&self) -> RepoResult<Vec<Area>> {
        let mut areas: Vec<Area> = self.read(|state| state.areas.values().cloned().collect());
        areas.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(areas)
    }

    fn query_areas(&self, query: &AreaQuery) -> RepoResult<PageSlice<Area>> {
        let search = query.search.as_deref().map(fold_case);
        let name = query.name.as_deref().map(fold_case);
        let description = query.description.as_deref().map(fold_case);

        let mut matching: Vec<Area> = self.read(|state| {
            state
                .areas
                .values()
                .filter(|area| {
                    search.as_deref().map_or(true, |needle| {
                        contains(&area.name, needle) || contains_opt(&area.description, needle)
                    })
                })
                .filter(|area| name.as_deref().map_or(true, |needle| contains(&area.name, needle)))
                .filter(|area| {
                    description
                        .as_deref()
                        .map_or(true, |needle| contains_opt(&area.description, needle))
                })
                .cloned()
                .collect()
        });

        matching.sort_by(|left, right| {
            let ordering = match query.sort_by {
                AreaSortField::Name => left.name.cmp(&right.name),
                AreaSortField::Description => left.description.cmp(&right.description),
                AreaSortField::CreatedAt => left.created_at.cmp(&right.created_at),
                AreaSortField::UpdatedAt => left.updated_at.cmp(&right.updated_at),
            };
            directed(ordering, query.sort_order).then_with(|| left.id.cmp(&right.id))
        });
        Ok(page_of(matching, query.page))
    }

    fn update_area(&self, area: &Area) -> RepoResult<()> {
        self.write(|state| {
            if !state.areas.contains_key(&area.id) {
                return Err(RepoError::NotFound(area.id));
            }
            ensure_unique_name(state, area)?;
            state.areas.insert(area.id, area.clone());
            Ok(())
        })
    }

    fn delete_area(&self, id: AreaId) -> RepoResult<()> {
        self.write(|state| {
            if !state.areas.contains_key(&id) {
                return Err(RepoError::NotFound(id));
            }
            if state.processes.values().any(|process| process.area_id == id) {
                return Err(RepoError::ForeignKeyViolation(format!(
                    "area {id} is referenced by processes"
                )));
            }
            state.areas.remove(&id);
            Ok(())
        })
    }

    fn count_areas(&self) -> RepoResult<u64> {
        Ok(len_u64(self.read(|state| state.areas.len())))
    }
}

impl ProcessRepository for MemoryStore {
    fn insert_process(&self, process: &Process) -> RepoResult<()> {
        self.write(|state| {
            if state.processes.contains_key(&process.id) {
                return Err(RepoError::UniqueViolation(format!(
                    "processes.id {}",
                    process.id
                )));
            }
            ensure_references(state, process)?;
            state.processes.insert(process.id, process.clone());
            Ok(())
        })
    }

    fn get_process(&self, id: ProcessId) -> RepoResult<Option<Process>> {
        Ok(self.read(|state| state.processes.get(&id).cloned()))
    }

    fn list_processes(&self, area_id: Option<AreaId>) -> RepoResult<Vec<Process>> {
        let mut processes: Vec<Process> = self.read(|state| {
            state
                .processes
                .values()
                .filter(|process| area_id.map_or(true, |area_id| process.area_id == area_id))
                .cloned()
                .collect()
        });
        processes.sort_by(oldest_first);
        Ok(processes)
    }

    fn list_children(&self, parent_id: ProcessId) -> RepoResult<Vec<Process>> {
        let mut children: Vec<Process> = self.read(|state| {
            state
                .processes
                .values()
                .filter(|process| process.parent_id == Some(parent_id))
                .cloned()
                .collect()
        });
        children.sort_by(oldest_first);
        Ok(children)
    }

    fn query_processes(&self, query: &ProcessQuery) -> RepoResult<PageSlice<Process>> {
        let search = query.search.as_deref().map(fold_case);

        let mut matching: Vec<Process> = self.read(|state| {
            state
                .processes
                .values()
                .filter(|process| {
                    search.as_deref().map_or(true, |needle| {
                        contains(&process.name, needle)
                            || contains_opt(&process.description, needle)
                            || contains_opt(&process.tools, needle)
                            || contains_opt(&process.responsible, needle)
                    })
                })
                .filter(|process| query.area_id.map_or(true, |area_id| process.area_id == area_id))
                .filter(|process| match query.parent {
                    ParentFilter::Any => true,
                    ParentFilter::Root => process.parent_id.is_none(),
                    ParentFilter::Of(parent_id) => process.parent_id == Some(parent_id),
                })
                .filter(|process| query.kind.map_or(true, |kind| process.kind == kind))
                .filter(|process| {
                    query.responsible.as_deref().map_or(true, |responsible| {
                        process.responsible.as_deref() == Some(responsible)
                    })
                })
                .cloned()
                .collect()
        });

        matching.sort_by(|left, right| {
            let ordering = match query.sort_by {
                ProcessSortField::Name => left.name.cmp(&right.name),
                ProcessSortField::Type => left.kind.as_str().cmp(right.kind.as_str()),
                ProcessSortField::Responsible => left.responsible.cmp(&right.responsible),
                ProcessSortField::CreatedAt => left.created_at.cmp(&right.created_at),
                ProcessSortField::UpdatedAt => left.updated_at.cmp(&right.updated_at),
            };
            directed(ordering, query.sort_order).then_with(|| left.id.cmp(&right.id))
        });
        Ok(page_of(matching, query.page))
    }

    fn update_process(&self, process: &Process) -> RepoResult<()> {
        self.write(|state| {
            if !state.processes.contains_key(&process.id) {
                return Err(RepoError::NotFound(process.id));
            }
            ensure_references(state, process)?;
            state.processes.insert(process.id, process.clone());
            Ok(())
        })
    }

    fn delete_process(&self, id: ProcessId) -> RepoResult<()> {
        self.write(|state| {
            if !state.processes.contains_key(&id) {
                return Err(RepoError::NotFound(id));
            }
            if state
                .processes
                .values()
                .any(|process| process.parent_id == Some(id))
            {
                return Err(RepoError::ForeignKeyViolation(format!(
                    "process {id} is referenced by child processes"
                )));
            }
            state.processes.remove(&id);
            Ok(())
        })
    }

    fn count_processes(&self) -> RepoResult<u64> {
        Ok(len_u64(self.read(|state| state.processes.len())))
    }

    fn count_by_area(&self, area_id: AreaId) -> RepoResult<u64> {
        let count = self.read(|state| {
            state
                .processes
                .values()
                .filter(|process| process.area_id == area_id)
                .count()
        });
        Ok(len_u64(count))
    }

    fn count_children(&self, parent_id: ProcessId) -> RepoResult<u64> {
        let count = self.read(|state| {
            state
                .processes
                .values()
                .filter(|process| process.parent_id == Some(parent_id))
                .count()
        });
        Ok(len_u64(count))
    }
}

fn ensure_unique_name(state: &MemoryState, area: &Area) -> RepoResult<()> {
    let taken = state
        .areas
        .values()
        .any(|other| other.id != area.id && other.name == area.name);
    if taken {
        return Err(RepoError::UniqueViolation(format!(
            "areas.name `{}`",
            area.name
        )));
    }
    Ok(())
}

fn ensure_references(state: &MemoryState, process: &Process) -> RepoResult<()> {
    if !state.areas.contains_key(&process.area_id) {
        return Err(RepoError::ForeignKeyViolation(format!(
            "area {} does not exist",
            process.area_id
        )));
    }
    if let Some(parent_id) = process.parent_id {
        if parent_id == process.id || !state.processes.contains_key(&parent_id) {
            return Err(RepoError::ForeignKeyViolation(format!(
                "parent process {parent_id} does not exist"
            )));
        }
    }
    Ok(())
}

fn oldest_first(left: &Process, right: &Process) -> Ordering {
    left.created_at
        .cmp(&right.created_at)
        .then_with(|| left.id.cmp(&right.id))
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn page_of<T>(items: Vec<T>, page: PageRequest) -> PageSlice<T> {
    let total_items = len_u64(items.len());
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    PageSlice {
        items: items.into_iter().skip(offset).take(limit).collect(),
        total_items,
    }
}

fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// `needle` must already be folded.
fn contains(haystack: &str, needle: &str) -> bool {
    fold_case(haystack).contains(needle)
}

fn contains_opt(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_deref()
        .map_or(false, |value| contains(value, needle))
}
