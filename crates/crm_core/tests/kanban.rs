mod common;

use common::ScriptedStore;
use crm_core::kanban::columns;
use crm_core::store::fixtures::Seed;
use crm_core::{assign_stage, Deal, DragEnd, DropTarget, MemoryStore, PipelineStage, StageMove};

fn fixtures() -> (Vec<Deal>, Vec<PipelineStage>) {
    (Deal::fixtures().unwrap(), PipelineStage::fixtures().unwrap())
}

fn drag(dragged: i64, over: Option<DropTarget>) -> DragEnd {
    DragEnd { dragged, over }
}

#[tokio::test]
async fn lead_deal_moves_to_qualified_in_place() {
    let (mut deals, stages) = fixtures();
    let store = MemoryStore::<Deal>::from_fixtures().unwrap();
    let index = deals.iter().position(|deal| deal.id == 6).unwrap();
    assert_eq!(deals[index].stage, "Lead");

    let outcome = assign_stage(
        &store,
        &mut deals,
        &stages,
        &drag(6, Some(DropTarget::Column("Qualified".to_string()))),
    )
    .await
    .unwrap();

    match outcome {
        StageMove::Moved { deal, from } => {
            assert_eq!(deal.stage, "Qualified");
            assert_eq!(from, "Lead");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(deals.len(), 12);
    assert_eq!(deals[index].id, 6);
    assert_eq!(deals[index].stage, "Qualified");
}

#[tokio::test]
async fn dropping_on_a_card_uses_that_card_stage() {
    let (mut deals, stages) = fixtures();
    let store = MemoryStore::<Deal>::from_fixtures().unwrap();

    let outcome = assign_stage(&store, &mut deals, &stages, &drag(6, Some(DropTarget::Card(1))))
        .await
        .unwrap();
    assert!(matches!(outcome, StageMove::Moved { .. }));
    let moved = deals.iter().find(|deal| deal.id == 6).unwrap();
    assert_eq!(moved.stage, "Negotiation");
}

#[tokio::test]
async fn column_can_be_addressed_by_stage_id() {
    let (mut deals, stages) = fixtures();
    let store = MemoryStore::<Deal>::from_fixtures().unwrap();

    assign_stage(&store, &mut deals, &stages, &drag(6, Some(DropTarget::Column("5".to_string()))))
        .await
        .unwrap();
    assert_eq!(deals.iter().find(|deal| deal.id == 6).unwrap().stage, "Closed Won");
}

#[tokio::test]
async fn failing_store_keeps_the_original_stage() {
    let (mut deals, stages) = fixtures();
    let store = ScriptedStore::<Deal>::rejecting_writes(deals.clone());
    let before = deals.clone();

    let result = assign_stage(
        &store,
        &mut deals,
        &stages,
        &drag(6, Some(DropTarget::Column("Qualified".to_string()))),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(deals, before);
    assert_eq!(deals.iter().find(|deal| deal.id == 6).unwrap().stage, "Lead");
}

#[tokio::test]
async fn no_target_or_same_stage_never_calls_the_store() {
    let (mut deals, stages) = fixtures();
    let store = ScriptedStore::<Deal>::serving(deals.clone());

    let outcome = assign_stage(&store, &mut deals, &stages, &drag(6, None)).await.unwrap();
    assert_eq!(outcome, StageMove::NoTarget);

    let outcome = assign_stage(
        &store,
        &mut deals,
        &stages,
        &drag(6, Some(DropTarget::Column("Nowhere".to_string()))),
    )
    .await
    .unwrap();
    assert_eq!(outcome, StageMove::NoTarget);

    let outcome = assign_stage(
        &store,
        &mut deals,
        &stages,
        &drag(6, Some(DropTarget::Column("Lead".to_string()))),
    )
    .await
    .unwrap();
    assert_eq!(outcome, StageMove::SameStage);

    let outcome = assign_stage(
        &store,
        &mut deals,
        &stages,
        &drag(404, Some(DropTarget::Column("Lead".to_string()))),
    )
    .await
    .unwrap();
    assert_eq!(outcome, StageMove::UnknownDeal);
    assert_eq!(store.calls(), 0);
}

#[test]
fn columns_follow_stage_positions_and_sum_amounts() {
    let (deals, mut stages) = fixtures();
    stages.reverse();

    let board = columns(&stages, &deals);
    let names: Vec<&str> = board.iter().map(|column| column.stage.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Lead", "Qualified", "Proposal", "Negotiation", "Closed Won", "Closed Lost"]
    );
    assert_eq!(board[0].count(), 3);
    assert_eq!(board[0].total_amount, 73500.0);
    assert_eq!(board[3].total_amount, 270000.0);
}
