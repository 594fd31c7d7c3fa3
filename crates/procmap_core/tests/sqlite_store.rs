use procmap_core::{
    open_db, open_db_in_memory, Area, AreaRepository, AreaService, ErrorKind, NewArea,
    NewProcess, Process, ProcessRepository, ProcessService, ProcessType, RepoError,
    ServiceError, SqliteStore, Store,
};
use rusqlite::Connection;

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn unique_name_backstop_fires_below_the_service() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();

    let first = Area::new(NewArea::new("RH")).unwrap();
    let racer = Area::new(NewArea::new("RH")).unwrap();
    store.areas().insert_area(&first).unwrap();

    let err = store.areas().insert_area(&racer).unwrap_err();
    assert!(matches!(err, RepoError::UniqueViolation(_)));
    assert_eq!(ServiceError::from(err).kind(), ErrorKind::Conflict);
}

#[test]
fn restrict_foreign_keys_refuse_orphaning_deletes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();

    let owner = Area::new(NewArea::new("RH")).unwrap();
    store.areas().insert_area(&owner).unwrap();
    let parent =
        Process::new(NewProcess::new("Parent", owner.id, ProcessType::Manual)).unwrap();
    store.processes().insert_process(&parent).unwrap();
    let child = Process::new(
        NewProcess::new("Child", owner.id, ProcessType::Manual).under(parent.id),
    )
    .unwrap();
    store.processes().insert_process(&child).unwrap();

    let area_err = store.areas().delete_area(owner.id).unwrap_err();
    assert!(matches!(area_err, RepoError::ForeignKeyViolation(_)));
    assert_eq!(ServiceError::from(area_err).kind(), ErrorKind::Conflict);

    let process_err = store.processes().delete_process(parent.id).unwrap_err();
    assert!(matches!(process_err, RepoError::ForeignKeyViolation(_)));
    assert_eq!(ServiceError::from(process_err).kind().http_status(), 409);

    assert_eq!(store.processes().count_processes().unwrap(), 2);
    assert_eq!(store.areas().count_areas().unwrap(), 1);
}

#[test]
fn failed_unit_rolls_back_earlier_writes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();

    let result: Result<(), RepoError> = store.atomically(|| {
        store
            .areas()
            .insert_area(&Area::new(NewArea::new("RH")).unwrap())?;
        store
            .areas()
            .insert_area(&Area::new(NewArea::new("RH")).unwrap())?;
        Ok(())
    });

    assert!(matches!(result, Err(RepoError::UniqueViolation(_))));
    assert_eq!(store.areas().count_areas().unwrap(), 0);
    assert!(conn.is_autocommit());
}

#[test]
fn nested_units_join_the_outer_transaction() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();

    let result: Result<(), RepoError> = store.atomically(|| {
        store.atomically(|| {
            store
                .areas()
                .insert_area(&Area::new(NewArea::new("Inner")).unwrap())
        })?;
        Err(RepoError::InvalidData("abort outer".to_string()))
    });

    assert!(result.is_err());
    assert_eq!(store.areas().count_areas().unwrap(), 0);
}

#[test]
fn file_backed_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("procmap.db");

    let area_id = {
        let conn = open_db(&path).unwrap();
        let store = SqliteStore::try_new(&conn).unwrap();
        let areas = AreaService::new(store);
        let processes = ProcessService::new(store);
        let area = areas.create_area(NewArea::new("Tecnologia")).unwrap();
        processes
            .create_process(NewProcess::new("Deploy", area.id, ProcessType::Systemic))
            .unwrap();
        area.id
    };

    let conn = open_db(&path).unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let areas = AreaService::new(store);
    let with_processes = areas.get_area_with_processes(area_id).unwrap();
    assert_eq!(with_processes.area.name, "Tecnologia");
    assert_eq!(with_processes.processes.len(), 1);
    assert_eq!(with_processes.processes[0].kind, ProcessType::Systemic);
}
