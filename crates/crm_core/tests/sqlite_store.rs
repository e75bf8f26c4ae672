use crm_core::db::{open_db, open_db_in_memory};
use crm_core::model::stage::PipelineStageDraft;
use crm_core::store::fixtures::Seed;
use crm_core::store::sqlite::SqlRecord;
use crm_core::store::{DealStageStore, SearchStore, SharedConnection};
use crm_core::{
    Company, CompanyDraft, Deal, PipelineStage, Record, RecordStore, SqliteStore, StoreError,
    StoreSet,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn shared_memory_db() -> SharedConnection {
    Arc::new(Mutex::new(open_db_in_memory().unwrap()))
}

fn seeded<R: Seed + SqlRecord>(conn: &SharedConnection) -> SqliteStore<R> {
    let store = SqliteStore::<R>::try_new(Arc::clone(conn)).unwrap();
    store.seed_if_empty(&R::fixtures().unwrap()).unwrap();
    store
}

#[test]
fn store_requires_migrated_schema() {
    let bare = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
    let err = SqliteStore::<Company>::try_new(bare).err().unwrap();
    assert!(matches!(err, StoreError::MissingRequiredTable("companies")));
}

#[tokio::test]
async fn seeding_imports_fixtures_once() {
    let conn = shared_memory_db();
    let store = SqliteStore::<Company>::try_new(Arc::clone(&conn)).unwrap();
    let fixtures = Company::fixtures().unwrap();

    assert_eq!(store.seed_if_empty(&fixtures).unwrap(), 8);
    assert_eq!(store.seed_if_empty(&fixtures).unwrap(), 0);
    assert_eq!(store.get_all().await.unwrap(), fixtures);
}

#[tokio::test]
async fn deal_rows_round_trip_close_dates_and_optional_links() {
    let conn = shared_memory_db();
    let store = seeded::<Deal>(&conn);
    let fixtures = Deal::fixtures().unwrap();
    assert_eq!(store.get_all().await.unwrap(), fixtures);
}

#[tokio::test]
async fn company_crud_round_trip() {
    let conn = shared_memory_db();
    let store = seeded::<Company>(&conn);

    let created = store
        .create(CompanyDraft {
            name: "Acme Rockets".to_string(),
            industry: "Aerospace".to_string(),
            revenue: 1_000.0,
            ..CompanyDraft::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, 9);
    assert_eq!(created.created_at, created.updated_at);

    let mut draft = created.to_draft();
    draft.name = "Acme Orbital".to_string();
    let updated = store.update(created.id, draft).await.unwrap();
    assert_eq!(updated.name, "Acme Orbital");
    assert_eq!(updated.created_at, created.created_at);

    assert!(store.delete(created.id).await.unwrap());
    assert!(!store.delete(created.id).await.unwrap());
    assert_eq!(store.get_by_id(created.id).await.unwrap(), None);
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() {
    let conn = shared_memory_db();
    let store = seeded::<Company>(&conn);
    let err = store
        .update(
            77,
            CompanyDraft {
                name: "Ghost".to_string(),
                industry: "None".to_string(),
                ..CompanyDraft::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id: 77, .. }));
}

#[tokio::test]
async fn invalid_draft_never_reaches_sql() {
    let conn = shared_memory_db();
    let store = seeded::<Company>(&conn);
    let err = store.create(CompanyDraft::default()).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.get_all().await.unwrap().len(), 8);
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() {
    let conn = shared_memory_db();
    let store = seeded::<Company>(&conn);

    let hits = store.search("energy").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Green Energy Partners");

    assert!(store.search("%").await.unwrap().is_empty());
}

#[tokio::test]
async fn stage_positions_stay_dense() {
    let conn = shared_memory_db();
    let store = seeded::<PipelineStage>(&conn);

    store
        .create(PipelineStageDraft {
            name: "Discovery".to_string(),
            color: "#0ea5e9".to_string(),
            position: Some(1),
        })
        .await
        .unwrap();
    let stages = store.get_all().await.unwrap();
    let names: Vec<&str> = stages.iter().map(|stage| stage.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Lead",
            "Discovery",
            "Qualified",
            "Proposal",
            "Negotiation",
            "Closed Won",
            "Closed Lost"
        ]
    );
    let positions: Vec<u32> = stages.iter().map(|stage| stage.position).collect();
    assert_eq!(positions, (0..7).collect::<Vec<u32>>());

    assert!(store.delete(1).await.unwrap());
    let stages = store.get_all().await.unwrap();
    assert_eq!(stages[0].name, "Discovery");
    assert_eq!(stages[0].position, 0);
    assert_eq!(stages.last().map(|stage| stage.position), Some(5));
}

#[tokio::test]
async fn stage_moves_in_both_directions_land_on_the_requested_column() {
    let conn = shared_memory_db();
    let store = seeded::<PipelineStage>(&conn);

    let mut draft = store.get_by_id(1).await.unwrap().unwrap().to_draft();
    draft.position = Some(2);
    assert_eq!(store.update(1, draft).await.unwrap().position, 2);
    let names: Vec<String> = store
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|stage| stage.name)
        .collect();
    assert_eq!(
        names,
        vec!["Qualified", "Proposal", "Lead", "Negotiation", "Closed Won", "Closed Lost"]
    );

    let mut draft = store.get_by_id(5).await.unwrap().unwrap().to_draft();
    draft.position = Some(0);
    assert_eq!(store.update(5, draft).await.unwrap().position, 0);
    let stages = store.get_all().await.unwrap();
    let order: Vec<(&str, u32)> = stages
        .iter()
        .map(|stage| (stage.name.as_str(), stage.position))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Closed Won", 0),
            ("Qualified", 1),
            ("Proposal", 2),
            ("Lead", 3),
            ("Negotiation", 4),
            ("Closed Lost", 5)
        ]
    );
}

#[tokio::test]
async fn duplicate_stage_name_is_a_conflict() {
    let conn = shared_memory_db();
    let store = seeded::<PipelineStage>(&conn);
    let err = store
        .create(PipelineStageDraft {
            name: "Proposal".to_string(),
            color: String::new(),
            position: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn stage_update_writes_only_the_stage_column() {
    let conn = shared_memory_db();
    let store = seeded::<Deal>(&conn);
    let before = store.get_by_id(6).await.unwrap().unwrap();

    let moved = store.update_stage(6, "Qualified").await.unwrap();
    assert_eq!(moved.stage, "Qualified");
    assert_eq!(moved.name, before.name);
    assert_eq!(moved.amount, before.amount);

    let err = store.update_stage(404, "Qualified").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id: 404, .. }));
}

#[tokio::test]
async fn store_set_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crm.sqlite3");

    {
        let conn = Arc::new(Mutex::new(open_db(&path).unwrap()));
        let set = StoreSet::sqlite(conn, true).unwrap();
        assert!(set.deals.delete(12).await.unwrap());
    }

    let conn = Arc::new(Mutex::new(open_db(&path).unwrap()));
    let set = StoreSet::sqlite(conn, true).unwrap();
    let deals = set.deals.get_all().await.unwrap();
    assert_eq!(deals.len(), 11);
    assert_eq!(set.stages.get_all().await.unwrap().len(), 6);
}
