//! Pipeline stage record and column-order maintenance.
//!
//! # Invariants
//! - `position` values form the dense sequence `0..n` after every write.
//! - `name` is unique per collection and is the join key for `Deal::stage`.

use super::{EntityKind, Record, RecordId};
use serde::{Deserialize, Serialize};

/// Position assigned to drafts that do not request a slot; sorts last.
pub const APPEND_POSITION: u32 = u32::MAX;

/// Named, ordered column of the deal pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub id: RecordId,
    pub name: String,
    /// Display color as a CSS hex string.
    #[serde(default)]
    pub color: String,
    /// Zero-based kanban column index.
    #[serde(default)]
    pub position: u32,
}

/// Editable stage fields.
///
/// `position = None` appends the stage after all existing columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStageDraft {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub position: Option<u32>,
}

impl Record for PipelineStage {
    type Draft = PipelineStageDraft;

    const KIND: EntityKind = EntityKind::PipelineStage;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: PipelineStageDraft, _now_ms: i64) -> Self {
        Self {
            id,
            name: draft.name,
            color: draft.color,
            position: draft.position.unwrap_or(APPEND_POSITION),
        }
    }

    fn apply_draft(&mut self, draft: PipelineStageDraft, _now_ms: i64) {
        self.name = draft.name;
        self.color = draft.color;
        if let Some(position) = draft.position {
            self.position = position;
        }
    }

    fn to_draft(&self) -> PipelineStageDraft {
        PipelineStageDraft {
            name: self.name.clone(),
            color: self.color.clone(),
            position: Some(self.position),
        }
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn conflict_with(&self, other: &Self) -> Option<String> {
        (self.id != other.id && self.name == other.name)
            .then(|| format!("pipeline stage `{}` already exists", self.name))
    }

    fn settle_order(collection: &mut Vec<Self>, moved: Option<RecordId>) {
        compact_positions(collection, moved);
    }
}

/// Sorts stages by position and renumbers them densely from zero.
///
/// The `moved` stage is lifted out first and reinserted at its requested
/// slot among the others, clamped to the end, so moves in either direction
/// land exactly where asked.
///
/// Returns the ids whose position value changed, so persistent stores can
/// write back only those rows.
pub fn compact_positions(
    stages: &mut Vec<PipelineStage>,
    moved: Option<RecordId>,
) -> Vec<RecordId> {
    let lifted = moved
        .and_then(|id| stages.iter().position(|stage| stage.id == id))
        .map(|index| stages.remove(index));

    stages.sort_by_key(|stage| stage.position);
    if let Some(stage) = lifted {
        let slot = usize::try_from(stage.position)
            .map_or(stages.len(), |slot| slot.min(stages.len()));
        stages.insert(slot, stage);
    }

    let mut changed = Vec::new();
    for (index, stage) in stages.iter_mut().enumerate() {
        let dense = u32::try_from(index).unwrap_or(APPEND_POSITION);
        if stage.position != dense {
            stage.position = dense;
            changed.push(stage.id);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::{compact_positions, PipelineStage, APPEND_POSITION};

    fn stage(id: i64, name: &str, position: u32) -> PipelineStage {
        PipelineStage {
            id,
            name: name.to_string(),
            color: "#000000".to_string(),
            position,
        }
    }

    #[test]
    fn compaction_closes_gaps_after_delete() {
        let mut stages = vec![stage(1, "Lead", 0), stage(3, "Proposal", 2)];
        let changed = compact_positions(&mut stages, None);
        assert_eq!(changed, vec![3]);
        assert_eq!(stages[1].position, 1);
    }

    #[test]
    fn moved_stage_wins_tie_on_insert() {
        let mut stages = vec![
            stage(1, "Lead", 0),
            stage(2, "Qualified", 1),
            stage(9, "Discovery", 1),
        ];
        compact_positions(&mut stages, Some(9));
        let names: Vec<_> = stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Lead", "Discovery", "Qualified"]);
    }

    #[test]
    fn moving_down_lands_on_requested_slot() {
        let mut stages = vec![
            stage(1, "Lead", 2),
            stage(2, "Qualified", 1),
            stage(3, "Proposal", 2),
            stage(4, "Negotiation", 3),
        ];
        let changed = compact_positions(&mut stages, Some(1));
        let order: Vec<_> = stages.iter().map(|s| (s.name.as_str(), s.position)).collect();
        assert_eq!(
            order,
            vec![("Qualified", 0), ("Proposal", 1), ("Lead", 2), ("Negotiation", 3)]
        );
        assert_eq!(changed, vec![2, 3]);
    }

    #[test]
    fn moving_up_shifts_the_rest_down() {
        let mut stages = vec![
            stage(1, "Lead", 0),
            stage(2, "Qualified", 1),
            stage(3, "Proposal", 2),
            stage(4, "Negotiation", 1),
        ];
        compact_positions(&mut stages, Some(4));
        let names: Vec<_> = stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Lead", "Negotiation", "Qualified", "Proposal"]);
    }

    #[test]
    fn requested_slot_past_the_end_is_clamped() {
        let mut stages = vec![stage(1, "Lead", 40), stage(2, "Qualified", 1)];
        compact_positions(&mut stages, Some(1));
        assert_eq!(stages[1].name, "Lead");
        assert_eq!(stages[1].position, 1);
    }

    #[test]
    fn append_position_lands_last() {
        let mut stages = vec![stage(5, "New", APPEND_POSITION), stage(1, "Lead", 0)];
        compact_positions(&mut stages, Some(5));
        assert_eq!(stages[1].name, "New");
        assert_eq!(stages[1].position, 1);
    }
}
