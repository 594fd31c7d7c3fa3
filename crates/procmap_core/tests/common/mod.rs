#![allow(dead_code)]

use procmap_core::{
    Area, AreaService, NewArea, NewProcess, Process, ProcessService, ProcessType, Store,
};

/// Expands one generic check into a test per store implementation.
macro_rules! store_contract {
    ($($name:ident),+ $(,)?) => {
        mod sqlite_store {
            $(
                #[test]
                fn $name() {
                    let conn = procmap_core::open_db_in_memory().unwrap();
                    let store = procmap_core::SqliteStore::try_new(&conn).unwrap();
                    super::$name(store);
                }
            )+
        }

        mod memory_store {
            $(
                #[test]
                fn $name() {
                    super::$name(procmap_core::MemoryStore::new());
                }
            )+
        }
    };
}

pub fn services<S: Store + Clone>(store: S) -> (AreaService<S>, ProcessService<S>) {
    (AreaService::new(store.clone()), ProcessService::new(store))
}

pub fn area<S: Store>(service: &AreaService<S>, name: &str) -> Area {
    service.create_area(NewArea::new(name)).unwrap()
}

pub fn root<S: Store>(service: &ProcessService<S>, area: &Area, name: &str) -> Process {
    service
        .create_process(NewProcess::new(name, area.id, ProcessType::Manual))
        .unwrap()
}

pub fn child<S: Store>(service: &ProcessService<S>, parent: &Process, name: &str) -> Process {
    service
        .create_process(NewProcess::new(name, parent.area_id, ProcessType::Manual).under(parent.id))
        .unwrap()
}
