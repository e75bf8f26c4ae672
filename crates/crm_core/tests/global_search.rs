mod common;

use common::ScriptedStore;
use crm_core::store::SearchStore;
use crm_core::{search_all, Company, EntityKind, SearchQuery, StoreSet};
use std::sync::Arc;
use std::time::Duration;

fn memory_set() -> StoreSet {
    StoreSet::in_memory(true, Duration::ZERO).unwrap()
}

#[tokio::test]
async fn hits_are_grouped_by_kind() {
    let hits = search_all(&memory_set(), &SearchQuery::new("tech")).await;
    let summary: Vec<(EntityKind, &str)> = hits
        .iter()
        .map(|hit| (hit.kind, hit.title.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (EntityKind::Contact, "Sarah Johnson"),
            (EntityKind::Contact, "Michael Chen"),
            (EntityKind::Company, "TechCorp Solutions"),
        ]
    );
    assert_eq!(hits[2].subtitle, "Technology");
}

#[tokio::test]
async fn each_kind_is_capped() {
    let hits = search_all(&memory_set(), &SearchQuery::new("e")).await;
    for kind in [EntityKind::Contact, EntityKind::Company, EntityKind::Deal] {
        let count = hits.iter().filter(|hit| hit.kind == kind).count();
        assert_eq!(count, 3, "{kind:?}");
    }
}

#[tokio::test]
async fn failing_kind_is_skipped() {
    let mut stores = memory_set();
    stores.companies =
        Arc::new(ScriptedStore::<Company>::unreachable()) as Arc<dyn SearchStore<Company>>;

    let hits = search_all(&stores, &SearchQuery::new("tech")).await;
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|hit| hit.kind == EntityKind::Contact));
}
