//! Process use-case service.
//!
//! # Responsibility
//! - Validate referential rules above the store: owning area exists, parent
//!   exists and lives in the same area, no parent cycles.
//! - Provide flat, paginated, hierarchical and detailed process reads.
//!
//! # Invariants
//! - Create/update checks run against the merged target state inside the
//!   same `Store::atomically` unit as the write.
//! - A process with direct children is never deleted; callers remove or
//!   re-parent the children first.
//! - A process with direct children never changes area.
//! - Hierarchical listing nests only within the fetched page.

use crate::model::area::AreaId;
use crate::model::process::{
    NewProcess, Process, ProcessDetails, ProcessId, ProcessNode, ProcessPatch,
};
use crate::model::validation::ValidationError;
use crate::pagination::Paginated;
use crate::query::ProcessQuery;
use crate::repo::area_repo::AreaRepository;
use crate::repo::process_repo::ProcessRepository;
use crate::repo::store::Store;
use crate::service::error::{Conflict, Entity, ServiceError, ServiceResult};
use crate::service::hierarchy::nest_page;
use log::{info, warn};
use std::collections::HashSet;

/// Process service facade over a store implementation.
pub struct ProcessService<S: Store> {
    store: S,
}

impl<S: Store> ProcessService<S> {
    /// Creates a service using the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates one process.
    ///
    /// Check order: required fields, area exists, parent exists, parent in
    /// the same area.
    pub fn create_process(&self, input: NewProcess) -> ServiceResult<Process> {
        let process = Process::new(input)?;
        let result = self.store.atomically(|| -> ServiceResult<()> {
            self.ensure_area_exists(process.area_id)?;
            if let Some(parent_id) = process.parent_id {
                let parent = self.require_parent(parent_id)?;
                ensure_same_area(&parent, process.area_id)?;
            }
            self.store.processes().insert_process(&process)?;
            Ok(())
        });

        match result {
            Ok(()) => {
                info!(
                    "event=process_create module=service status=ok process_id={} area_id={} root={}",
                    process.id,
                    process.area_id,
                    process.is_root()
                );
                Ok(process)
            }
            Err(err) => {
                warn!(
                    "event=process_create module=service status=rejected kind={}",
                    err.kind().as_str()
                );
                Err(err)
            }
        }
    }

    /// All processes, optionally limited to one area, oldest first.
    pub fn list_processes(&self, area_id: Option<AreaId>) -> ServiceResult<Vec<Process>> {
        Ok(self.store.processes().list_processes(area_id)?)
    }

    /// Filtered, sorted page of processes.
    pub fn list_processes_paginated(
        &self,
        query: &ProcessQuery,
    ) -> ServiceResult<Paginated<Process>> {
        let slice = self.store.processes().query_processes(query)?;
        Ok(Paginated::new(slice.items, query.page.meta(slice.total_items)))
    }

    /// Filtered page re-nested by parent.
    ///
    /// Nesting is local to the fetched page: a process whose parent is not
    /// in the page is returned as a top-level entry. `meta` describes the
    /// flat page, so `data` may hold fewer entries than `meta.limit`.
    pub fn list_hierarchical(
        &self,
        query: &ProcessQuery,
    ) -> ServiceResult<Paginated<ProcessNode>> {
        let slice = self.store.processes().query_processes(query)?;
        Ok(Paginated::new(
            nest_page(slice.items),
            query.page.meta(slice.total_items),
        ))
    }

    pub fn get_process(&self, id: ProcessId) -> ServiceResult<Process> {
        self.store
            .processes()
            .get_process(id)?
            .ok_or_else(|| ServiceError::not_found(Entity::Process, id))
    }

    /// Process with its area, parent and immediate children resolved.
    pub fn get_process_with_details(&self, id: ProcessId) -> ServiceResult<ProcessDetails> {
        let process = self.get_process(id)?;
        let area = self
            .store
            .areas()
            .get_area(process.area_id)?
            .ok_or_else(|| ServiceError::not_found(Entity::Area, process.area_id))?;
        let parent = match process.parent_id {
            Some(parent_id) => Some(self.require_parent(parent_id)?.summary()),
            None => None,
        };
        let children = self.store.processes().list_children(id)?;

        Ok(ProcessDetails {
            area: area.summary(),
            parent,
            children_count: u64::try_from(children.len()).unwrap_or(u64::MAX),
            children,
            process,
        })
    }

    /// Applies `patch` after validating the merged target state.
    pub fn update_process(&self, id: ProcessId, patch: ProcessPatch) -> ServiceResult<Process> {
        let result = self.store.atomically(|| -> ServiceResult<Process> {
            let current = self.get_process(id)?;
            let target = current.merged(patch)?;

            self.ensure_area_exists(target.area_id)?;
            if target.area_id != current.area_id {
                let children = self.store.processes().count_children(id)?;
                if children > 0 {
                    return Err(ValidationError::AreaChangeWithChildren {
                        process_id: id,
                        children,
                    }
                    .into());
                }
            }
            if let Some(parent_id) = target.parent_id {
                if parent_id == id {
                    return Err(ValidationError::SelfParent(id).into());
                }
                let parent = self.require_parent(parent_id)?;
                ensure_same_area(&parent, target.area_id)?;
                if self.is_descendant(parent_id, id)? {
                    return Err(ValidationError::Cycle {
                        process_id: id,
                        parent_id,
                    }
                    .into());
                }
            }

            self.store.processes().update_process(&target)?;
            Ok(target)
        });

        match &result {
            Ok(_) => info!("event=process_update module=service status=ok process_id={id}"),
            Err(err) => warn!(
                "event=process_update module=service status=rejected process_id={id} kind={}",
                err.kind().as_str()
            ),
        }
        result
    }

    /// Deletes a process without children.
    pub fn delete_process(&self, id: ProcessId) -> ServiceResult<()> {
        let result = self.store.atomically(|| -> ServiceResult<()> {
            self.get_process(id)?;
            let children = self.store.processes().count_children(id)?;
            if children > 0 {
                return Err(ServiceError::Conflict(Conflict::ProcessHasChildren {
                    process_id: id,
                    children,
                }));
            }
            self.store.processes().delete_process(id)?;
            Ok(())
        });

        match &result {
            Ok(()) => info!("event=process_delete module=service status=ok process_id={id}"),
            Err(err) => warn!(
                "event=process_delete module=service status=rejected process_id={id} kind={}",
                err.kind().as_str()
            ),
        }
        result
    }

    pub fn count_total(&self) -> ServiceResult<u64> {
        Ok(self.store.processes().count_processes()?)
    }

    pub fn count_by_area(&self, area_id: AreaId) -> ServiceResult<u64> {
        Ok(self.store.processes().count_by_area(area_id)?)
    }

    pub fn count_children(&self, parent_id: ProcessId) -> ServiceResult<u64> {
        Ok(self.store.processes().count_children(parent_id)?)
    }

    fn ensure_area_exists(&self, area_id: AreaId) -> ServiceResult<()> {
        match self.store.areas().get_area(area_id)? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found(Entity::Area, area_id)),
        }
    }

    fn require_parent(&self, parent_id: ProcessId) -> ServiceResult<Process> {
        self.store
            .processes()
            .get_process(parent_id)?
            .ok_or_else(|| ServiceError::not_found(Entity::ParentProcess, parent_id))
    }

    // Walks up from `candidate` looking for `ancestor`. A repeated id means
    // the stored chain is already cyclic; that is reported as a cycle too.
    fn is_descendant(&self, candidate: ProcessId, ancestor: ProcessId) -> ServiceResult<bool> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate);
        while let Some(current) = cursor {
            if current == ancestor || !visited.insert(current) {
                return Ok(true);
            }
            cursor = self
                .store
                .processes()
                .get_process(current)?
                .and_then(|process| process.parent_id);
        }
        Ok(false)
    }
}

fn ensure_same_area(parent: &Process, area_id: AreaId) -> Result<(), ValidationError> {
    if parent.area_id != area_id {
        return Err(ValidationError::ParentInDifferentArea {
            parent_id: parent.id,
            area_id,
        });
    }
    Ok(())
}
