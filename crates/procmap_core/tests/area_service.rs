#[macro_use]
mod common;

use common::{area, root, services};
use procmap_core::{
    AreaPatch, AreaQuery, AreaSortField, Conflict, ErrorKind, ListParams, NewArea, PageRequest,
    ServiceError, SortOrder, Store,
};

store_contract!(
    create_then_get_round_trips,
    duplicate_trimmed_name_conflicts,
    blank_name_is_validation_error,
    missing_area_is_not_found,
    update_refreshes_updated_at,
    delete_is_blocked_until_processes_are_gone,
    paginated_search_is_case_insensitive,
    search_treats_wildcards_literally,
    search_folds_accented_letters,
    sort_by_name_with_page_window,
    overview_lists_newest_first_with_counts,
);

fn create_then_get_round_trips<S: Store + Clone>(store: S) {
    let (areas, _) = services(store);
    let created = areas
        .create_area(NewArea::new("  Recursos Humanos ").with_description(" Pessoas "))
        .unwrap();

    let fetched = areas.get_area(created.id).unwrap();
    assert_eq!(fetched.name, "Recursos Humanos");
    assert_eq!(fetched.description.as_deref(), Some("Pessoas"));
    assert_eq!(fetched.created_at, fetched.updated_at);
    assert_eq!(fetched, created);
}

fn duplicate_trimmed_name_conflicts<S: Store + Clone>(store: S) {
    let (areas, _) = services(store);
    area(&areas, "RH");

    let err = areas.create_area(NewArea::new("RH")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "area with this name already exists");

    let err = areas.create_area(NewArea::new(" RH ")).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Conflict(Conflict::DuplicateAreaName(_))
    ));
    assert_eq!(areas.count_areas().unwrap(), 1);
}

fn blank_name_is_validation_error<S: Store + Clone>(store: S) {
    let (areas, _) = services(store);
    for name in ["", "   "] {
        let err = areas.create_area(NewArea::new(name)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.kind().http_status(), 400);
    }
    assert_eq!(areas.count_areas().unwrap(), 0);
}

fn missing_area_is_not_found<S: Store + Clone>(store: S) {
    let (areas, _) = services(store);
    let id = uuid::Uuid::new_v4();

    assert_eq!(areas.get_area(id).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(
        areas
            .update_area(id, AreaPatch::default())
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert_eq!(areas.delete_area(id).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(
        areas.get_area_with_processes(id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

fn update_refreshes_updated_at<S: Store + Clone>(store: S) {
    let (areas, _) = services(store);
    let created = area(&areas, "Old");

    let updated = areas
        .update_area(
            created.id,
            AreaPatch {
                name: Some("New".to_string()),
                description: None,
            },
        )
        .unwrap();

    let fetched = areas.get_area(created.id).unwrap();
    assert_eq!(fetched, updated);
    assert_eq!(fetched.name, "New");
    assert_eq!(fetched.created_at, created.created_at);
    assert!(fetched.updated_at > created.updated_at);
}

fn delete_is_blocked_until_processes_are_gone<S: Store + Clone>(store: S) {
    let (areas, processes) = services(store);
    let owner = area(&areas, "RH");
    let owned = root(&processes, &owner, "Recrutamento");

    let err = areas.delete_area(owner.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "cannot delete area with existing processes");
    assert!(areas.get_area(owner.id).is_ok());

    processes.delete_process(owned.id).unwrap();
    areas.delete_area(owner.id).unwrap();
    assert_eq!(areas.get_area(owner.id).unwrap_err().kind(), ErrorKind::NotFound);
}

fn paginated_search_is_case_insensitive<S: Store + Clone>(store: S) {
    let (areas, _) = services(store);
    area(&areas, "Recursos Humanos");
    areas
        .create_area(NewArea::new("Tecnologia").with_description("Sistemas e humanos"))
        .unwrap();
    area(&areas, "Financeiro");

    let page = areas
        .list_areas_paginated(&AreaQuery::default().with_search("HUMANOS"))
        .unwrap();
    assert_eq!(page.meta.total_items, 2);
    assert_eq!(page.data.len(), 2);

    let by_name = areas
        .list_areas_paginated(&AreaQuery::from_params(&ListParams {
            name: Some("humanos".to_string()),
            ..ListParams::default()
        }))
        .unwrap();
    assert_eq!(by_name.meta.total_items, 1);
    assert_eq!(by_name.data[0].name, "Recursos Humanos");
}

fn search_treats_wildcards_literally<S: Store + Clone>(store: S) {
    let (areas, _) = services(store);
    area(&areas, "Vendas 100%");
    area(&areas, "Vendas 1000");

    let page = areas
        .list_areas_paginated(&AreaQuery::default().with_search("0%"))
        .unwrap();
    assert_eq!(page.meta.total_items, 1);
    assert_eq!(page.data[0].name, "Vendas 100%");
}

fn search_folds_accented_letters<S: Store + Clone>(store: S) {
    let (areas, _) = services(store);
    area(&areas, "Gestão");
    area(&areas, "Tecnologia");

    let page = areas
        .list_areas_paginated(&AreaQuery::default().with_search("GESTÃO"))
        .unwrap();
    assert_eq!(page.meta.total_items, 1);
    assert_eq!(page.data[0].name, "Gestão");

    let lower = areas
        .list_areas_paginated(&AreaQuery::default().with_search("gestão"))
        .unwrap();
    assert_eq!(lower.meta.total_items, 1);
}

fn sort_by_name_with_page_window<S: Store + Clone>(store: S) {
    let (areas, _) = services(store);
    for name in ["Delta", "Alfa", "Echo", "Charlie", "Bravo"] {
        area(&areas, name);
    }

    let query = AreaQuery::default()
        .sorted(AreaSortField::Name, SortOrder::Asc)
        .with_page(PageRequest::new(Some(2), Some(2)));
    let page = areas.list_areas_paginated(&query).unwrap();

    let names: Vec<_> = page.data.iter().map(|area| area.name.as_str()).collect();
    assert_eq!(names, vec!["Charlie", "Delta"]);
    assert_eq!(page.meta.total_items, 5);
    assert_eq!(page.meta.total_pages, 3);
    assert_eq!(page.meta.next_page, Some(3));
    assert_eq!(page.meta.previous_page, Some(1));

    let descending = areas
        .list_areas_paginated(&AreaQuery::default().sorted(AreaSortField::Name, SortOrder::Desc))
        .unwrap();
    assert_eq!(descending.data[0].name, "Echo");
}

fn overview_lists_newest_first_with_counts<S: Store + Clone>(store: S) {
    let (areas, processes) = services(store);
    let busy = area(&areas, "RH");
    let idle = area(&areas, "TI");
    root(&processes, &busy, "Recrutamento");
    root(&processes, &busy, "Folha de pagamento");

    let overviews = areas.list_areas().unwrap();
    assert_eq!(overviews.len(), 2);
    for pair in overviews.windows(2) {
        assert!(pair[0].area.created_at >= pair[1].area.created_at);
    }
    let count_of = |id| {
        overviews
            .iter()
            .find(|overview| overview.area.id == id)
            .map(|overview| overview.process_count)
    };
    assert_eq!(count_of(busy.id), Some(2));
    assert_eq!(count_of(idle.id), Some(0));

    let json = serde_json::to_value(&overviews[0]).unwrap();
    assert!(json.get("processCount").is_some());
    assert!(json.get("createdAt").is_some());
}
