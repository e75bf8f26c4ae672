//! Deal record.

use super::{EntityKind, Record, RecordId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stage name that marks a won deal.
pub const STAGE_CLOSED_WON: &str = "Closed Won";
/// Stage name that marks a lost deal.
pub const STAGE_CLOSED_LOST: &str = "Closed Lost";

/// Sales opportunity moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: RecordId,
    pub name: String,
    /// Positive at creation time.
    #[serde(default)]
    pub amount: f64,
    /// Soft reference to a `PipelineStage` by name.
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub close_date: Option<NaiveDate>,
    #[serde(default)]
    pub contact_id: Option<RecordId>,
    #[serde(default)]
    pub company_id: Option<RecordId>,
    /// Owning user as reported by the backend.
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Deal {
    /// Returns whether the deal sits in a terminal stage.
    pub fn is_closed(&self) -> bool {
        self.stage == STAGE_CLOSED_WON || self.stage == STAGE_CLOSED_LOST
    }
}

/// Editable deal fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealDraft {
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub close_date: Option<NaiveDate>,
    #[serde(default)]
    pub contact_id: Option<RecordId>,
    #[serde(default)]
    pub company_id: Option<RecordId>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub notes: String,
}

impl Default for DealDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            amount: 0.0,
            stage: "Lead".to_string(),
            close_date: None,
            contact_id: None,
            company_id: None,
            owner: None,
            notes: String::new(),
        }
    }
}

impl Record for Deal {
    type Draft = DealDraft;

    const KIND: EntityKind = EntityKind::Deal;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: DealDraft, now_ms: i64) -> Self {
        Self {
            id,
            name: draft.name,
            amount: draft.amount,
            stage: draft.stage,
            close_date: draft.close_date,
            contact_id: draft.contact_id,
            company_id: draft.company_id,
            owner: draft.owner,
            notes: draft.notes,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    fn apply_draft(&mut self, draft: DealDraft, now_ms: i64) {
        self.name = draft.name;
        self.amount = draft.amount;
        self.stage = draft.stage;
        self.close_date = draft.close_date;
        self.contact_id = draft.contact_id;
        self.company_id = draft.company_id;
        self.owner = draft.owner;
        self.notes = draft.notes;
        self.updated_at = now_ms;
    }

    fn to_draft(&self) -> DealDraft {
        DealDraft {
            name: self.name.clone(),
            amount: self.amount,
            stage: self.stage.clone(),
            close_date: self.close_date,
            contact_id: self.contact_id,
            company_id: self.company_id,
            owner: self.owner.clone(),
            notes: self.notes.clone(),
        }
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}
