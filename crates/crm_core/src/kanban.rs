//! Kanban Stage Assigner.
//!
//! # Responsibility
//! - Resolve a drag-end report to a target pipeline stage.
//! - Move the dragged deal through the stage-update store operation and
//!   reconcile the deal collection.
//! - Project deals into per-stage columns.
//!
//! # Invariants
//! - No target or an unchanged stage never calls the store.
//! - A failed store call leaves the deal collection untouched.

use crate::model::deal::Deal;
use crate::model::stage::PipelineStage;
use crate::model::RecordId;
use crate::reconcile::{reconcile, Mutation};
use crate::store::{DealStageStore, StoreResult};
use log::{info, warn};

/// What the dragged card was released over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A column, identified by stage id or stage name.
    Column(String),
    /// Another deal card.
    Card(RecordId),
}

/// Drag-end report from the drag-and-drop capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub dragged: RecordId,
    pub over: Option<DropTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageMove {
    /// Released outside any stage.
    NoTarget,
    /// The dragged id is not in the collection.
    UnknownDeal,
    SameStage,
    Moved { deal: Deal, from: String },
}

/// Stages in column order.
pub fn ordered_stages(stages: &[PipelineStage]) -> Vec<&PipelineStage> {
    let mut ordered: Vec<&PipelineStage> = stages.iter().collect();
    ordered.sort_by_key(|stage| stage.position);
    ordered
}

/// Finds the stage a drop lands in, scanning stages in column order.
pub fn resolve_target_stage<'a>(
    target: &DropTarget,
    stages: &'a [PipelineStage],
    deals: &[Deal],
) -> Option<&'a PipelineStage> {
    ordered_stages(stages)
        .into_iter()
        .find(|stage| match target {
            DropTarget::Column(key) => stage.name == *key || stage.id.to_string() == *key,
            DropTarget::Card(card_id) => deals
                .iter()
                .any(|deal| deal.id == *card_id && deal.stage == stage.name),
        })
}

/// Applies a drag-end to `deals` through `store`.
pub async fn assign_stage<S>(
    store: &S,
    deals: &mut Vec<Deal>,
    stages: &[PipelineStage],
    drag: &DragEnd,
) -> StoreResult<StageMove>
where
    S: DealStageStore + ?Sized,
{
    let Some(target) = drag
        .over
        .as_ref()
        .and_then(|over| resolve_target_stage(over, stages, deals))
    else {
        return Ok(StageMove::NoTarget);
    };
    let Some(current) = deals.iter().find(|deal| deal.id == drag.dragged) else {
        return Ok(StageMove::UnknownDeal);
    };
    if current.stage == target.name {
        return Ok(StageMove::SameStage);
    }
    let from = current.stage.clone();

    match store.update_stage(drag.dragged, &target.name).await {
        Ok(updated) => {
            info!(
                "event=kanban_move module=kanban status=ok deal_id={} from={from} to={}",
                drag.dragged, target.name
            );
            reconcile(deals, Mutation::Updated(updated.clone()));
            Ok(StageMove::Moved {
                deal: updated,
                from,
            })
        }
        Err(err) => {
            warn!(
                "event=kanban_move module=kanban status=error deal_id={} to={} error={err}",
                drag.dragged, target.name
            );
            Err(err)
        }
    }
}

/// One kanban column.
#[derive(Debug, Clone, PartialEq)]
pub struct StageColumn<'a> {
    pub stage: &'a PipelineStage,
    pub deals: Vec<&'a Deal>,
    pub total_amount: f64,
}

impl StageColumn<'_> {
    pub fn count(&self) -> usize {
        self.deals.len()
    }
}

/// Groups deals under their stage, in column order.
///
/// Deals naming an unknown stage belong to no column.
pub fn columns<'a>(stages: &'a [PipelineStage], deals: &'a [Deal]) -> Vec<StageColumn<'a>> {
    ordered_stages(stages)
        .into_iter()
        .map(|stage| {
            let filed: Vec<&Deal> = deals.iter().filter(|deal| deal.stage == stage.name).collect();
            StageColumn {
                stage,
                total_amount: filed.iter().map(|deal| deal.amount).sum(),
                deals: filed,
            }
        })
        .collect()
}
