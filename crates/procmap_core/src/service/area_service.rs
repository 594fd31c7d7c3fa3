//! Area use-case service.
//!
//! # Responsibility
//! - Enforce area rules above the store: required name, unique name,
//!   delete blocked while processes exist.
//! - Expose flat, overview and paginated area reads.
//!
//! # Invariants
//! - Each check-then-write pair runs inside one `Store::atomically` unit.
//! - Name uniqueness compares trimmed names; the store's unique constraint
//!   backs up racing writers.

use crate::model::area::{Area, AreaId, AreaOverview, AreaPatch, AreaWithProcesses, NewArea};
use crate::pagination::Paginated;
use crate::query::AreaQuery;
use crate::repo::area_repo::AreaRepository;
use crate::repo::process_repo::ProcessRepository;
use crate::repo::store::Store;
use crate::service::error::{Conflict, Entity, ServiceError, ServiceResult};
use log::{info, warn};

/// Area service facade over a store implementation.
pub struct AreaService<S: Store> {
    store: S,
}

impl<S: Store> AreaService<S> {
    /// Creates a service using the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates one area with a unique trimmed name.
    pub fn create_area(&self, input: NewArea) -> ServiceResult<Area> {
        let area = Area::new(input)?;
        let result = self.store.atomically(|| -> ServiceResult<()> {
            self.ensure_name_available(&area.name, None)?;
            self.store.areas().insert_area(&area)?;
            Ok(())
        });

        match result {
            Ok(()) => {
                info!("event=area_create module=service status=ok area_id={}", area.id);
                Ok(area)
            }
            Err(err) => {
                warn!(
                    "event=area_create module=service status=rejected kind={}",
                    err.kind().as_str()
                );
                Err(err)
            }
        }
    }

    /// All areas, newest first, each with its process count.
    pub fn list_areas(&self) -> ServiceResult<Vec<AreaOverview>> {
        let areas = self.store.areas().list_areas()?;
        areas
            .into_iter()
            .map(|area| -> ServiceResult<AreaOverview> {
                let process_count = self.store.processes().count_by_area(area.id)?;
                Ok(AreaOverview {
                    area,
                    process_count,
                })
            })
            .collect()
    }

    /// Filtered, sorted page of areas.
    pub fn list_areas_paginated(&self, query: &AreaQuery) -> ServiceResult<Paginated<Area>> {
        let slice = self.store.areas().query_areas(query)?;
        Ok(Paginated::new(slice.items, query.page.meta(slice.total_items)))
    }

    pub fn get_area(&self, id: AreaId) -> ServiceResult<Area> {
        self.store
            .areas()
            .get_area(id)?
            .ok_or_else(|| ServiceError::not_found(Entity::Area, id))
    }

    /// Area plus every process it owns, oldest first.
    pub fn get_area_with_processes(&self, id: AreaId) -> ServiceResult<AreaWithProcesses> {
        let area = self.get_area(id)?;
        let processes = self.store.processes().list_processes(Some(id))?;
        Ok(AreaWithProcesses {
            area,
            process_count: u64::try_from(processes.len()).unwrap_or(u64::MAX),
            processes,
        })
    }

    /// Applies `patch`; a changed name must stay unique.
    pub fn update_area(&self, id: AreaId, patch: AreaPatch) -> ServiceResult<Area> {
        let result = self.store.atomically(|| -> ServiceResult<Area> {
            let current = self.get_area(id)?;
            let updated = current.merged(patch)?;
            if updated.name != current.name {
                self.ensure_name_available(&updated.name, Some(id))?;
            }
            self.store.areas().update_area(&updated)?;
            Ok(updated)
        });

        match &result {
            Ok(_) => info!("event=area_update module=service status=ok area_id={id}"),
            Err(err) => warn!(
                "event=area_update module=service status=rejected area_id={id} kind={}",
                err.kind().as_str()
            ),
        }
        result
    }

    /// Deletes an area that owns no processes.
    pub fn delete_area(&self, id: AreaId) -> ServiceResult<()> {
        let result = self.store.atomically(|| -> ServiceResult<()> {
            self.get_area(id)?;
            let processes = self.store.processes().count_by_area(id)?;
            if processes > 0 {
                return Err(ServiceError::Conflict(Conflict::AreaHasProcesses {
                    area_id: id,
                    processes,
                }));
            }
            self.store.areas().delete_area(id)?;
            Ok(())
        });

        match &result {
            Ok(()) => info!("event=area_delete module=service status=ok area_id={id}"),
            Err(err) => warn!(
                "event=area_delete module=service status=rejected area_id={id} kind={}",
                err.kind().as_str()
            ),
        }
        result
    }

    pub fn count_areas(&self) -> ServiceResult<u64> {
        Ok(self.store.areas().count_areas()?)
    }

    fn ensure_name_available(&self, name: &str, own_id: Option<AreaId>) -> ServiceResult<()> {
        match self.store.areas().find_area_by_name(name)? {
            Some(existing) if Some(existing.id) != own_id => Err(ServiceError::Conflict(
                Conflict::DuplicateAreaName(name.to_string()),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AreaService;
    use crate::model::area::{AreaPatch, NewArea};
    use crate::model::process::{NewProcess, Process, ProcessType};
    use crate::repo::memory_repo::MemoryStore;
    use crate::repo::process_repo::ProcessRepository;
    use crate::service::error::{Conflict, ErrorKind, ServiceError};

    #[test]
    fn rename_to_own_name_with_different_spacing_is_allowed() {
        let service = AreaService::new(MemoryStore::new());
        let area = service.create_area(NewArea::new("RH")).unwrap();

        let renamed = service
            .update_area(
                area.id,
                AreaPatch {
                    name: Some("  RH  ".to_string()),
                    description: None,
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "RH");
        assert!(renamed.updated_at > area.updated_at);
    }

    #[test]
    fn rename_onto_another_area_conflicts() {
        let service = AreaService::new(MemoryStore::new());
        service.create_area(NewArea::new("RH")).unwrap();
        let other = service.create_area(NewArea::new("TI")).unwrap();

        let err = service
            .update_area(
                other.id,
                AreaPatch {
                    name: Some("RH".to_string()),
                    description: None,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Conflict(Conflict::DuplicateAreaName(_))
        ));
        assert_eq!(service.get_area(other.id).unwrap().name, "TI");
    }

    #[test]
    fn rejected_update_reports_kind_and_keeps_area() {
        let service = AreaService::new(MemoryStore::new());
        let area = service.create_area(NewArea::new("RH")).unwrap();

        let blank = service
            .update_area(
                area.id,
                AreaPatch {
                    name: Some("   ".to_string()),
                    description: None,
                },
            )
            .unwrap_err();
        assert_eq!(blank.kind(), ErrorKind::Validation);

        let missing = service
            .update_area(uuid::Uuid::new_v4(), AreaPatch::default())
            .unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(service.get_area(area.id).unwrap(), area);
    }

    #[test]
    fn delete_blocked_message_names_processes() {
        let store = MemoryStore::new();
        let service = AreaService::new(store.clone());
        let area = service.create_area(NewArea::new("RH")).unwrap();
        let process =
            Process::new(NewProcess::new("Onboarding", area.id, ProcessType::Manual)).unwrap();
        store.insert_process(&process).unwrap();

        let err = service.delete_area(area.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "cannot delete area with existing processes");
    }

    #[test]
    fn overview_counts_owned_processes() {
        let store = MemoryStore::new();
        let service = AreaService::new(store.clone());
        let busy = service.create_area(NewArea::new("RH")).unwrap();
        service.create_area(NewArea::new("TI")).unwrap();
        for name in ["Recrutamento", "Folha"] {
            let process =
                Process::new(NewProcess::new(name, busy.id, ProcessType::Manual)).unwrap();
            store.insert_process(&process).unwrap();
        }

        let overviews = service.list_areas().unwrap();
        let busy_overview = overviews
            .iter()
            .find(|overview| overview.area.id == busy.id)
            .unwrap();
        assert_eq!(busy_overview.process_count, 2);
        assert_eq!(overviews.len(), 2);

        let detailed = service.get_area_with_processes(busy.id).unwrap();
        assert_eq!(detailed.process_count, 2);
        assert!(detailed
            .processes
            .iter()
            .all(|process| process.area_id == busy.id));
    }
}
