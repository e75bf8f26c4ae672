use crm_core::reconcile::reconcile_outcome;
use crm_core::store::fixtures::Seed;
use crm_core::{reconcile, Company, Mutation, ReconcileEffect, StoreError};

fn companies() -> Vec<Company> {
    Company::fixtures().unwrap()
}

#[test]
fn created_record_is_appended_last() {
    let mut collection = companies();
    let mut created = collection[0].clone();
    created.id = 99;
    created.name = "Acme".to_string();

    let effect = reconcile(&mut collection, Mutation::Created(created));
    assert_eq!(effect, ReconcileEffect::Appended);
    assert_eq!(collection.len(), 9);
    assert_eq!(collection.last().map(|company| company.id), Some(99));
}

#[test]
fn update_replaces_in_place_without_moving_neighbours() {
    let mut collection = companies();
    let before: Vec<i64> = collection.iter().map(|company| company.id).collect();
    let mut updated = collection[3].clone();
    updated.name = "Renamed Clinics".to_string();

    let effect = reconcile(&mut collection, Mutation::Updated(updated));
    assert_eq!(effect, ReconcileEffect::Replaced(3));
    assert_eq!(collection[3].name, "Renamed Clinics");
    let after: Vec<i64> = collection.iter().map(|company| company.id).collect();
    assert_eq!(before, after);
}

#[test]
fn delete_removes_only_the_matching_id() {
    let mut collection = companies();
    let effect = reconcile(&mut collection, Mutation::Deleted(2));
    assert_eq!(effect, ReconcileEffect::Removed(1));
    assert_eq!(collection.len(), 7);
    assert!(collection.iter().all(|company| company.id != 2));

    let effect = reconcile(&mut collection, Mutation::Deleted(2));
    assert_eq!(effect, ReconcileEffect::Unchanged);
    assert_eq!(collection.len(), 7);
}

#[test]
fn failed_outcome_leaves_collection_untouched() {
    let mut collection = companies();
    let before = collection.clone();
    let outcome: Result<Mutation<Company>, StoreError> =
        Err(StoreError::Unavailable("offline"));

    let result = reconcile_outcome(&mut collection, outcome);
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
    assert_eq!(collection, before);
}
