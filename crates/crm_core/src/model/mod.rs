//! Canonical record model for the four CRM entity kinds.
//!
//! # Responsibility
//! - Define the record and draft shapes used by stores, views and forms.
//! - Provide the `Record` contract every store implementation relies on.
//!
//! # Invariants
//! - Every record is identified by one canonical integer `id`.
//! - Field naming is snake_case; backend naming variants are normalized at
//!   the store boundary, never here.
//! - Cross-entity references are typed, nullable and soft (not enforced).

use crate::form::validate::Validate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod company;
pub mod contact;
pub mod deal;
pub mod stage;

/// Canonical identifier shared by all entity kinds.
pub type RecordId = i64;

/// Entity kind discriminator used in logs, errors and search hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Company,
    Contact,
    Deal,
    PipelineStage,
}

impl EntityKind {
    /// Stable lowercase tag used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Contact => "contact",
            Self::Deal => "deal",
            Self::PipelineStage => "pipeline_stage",
        }
    }

    /// Human-readable label used in user notifications.
    pub fn label(self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Contact => "Contact",
            Self::Deal => "Deal",
            Self::PipelineStage => "Pipeline stage",
        }
    }

    /// Lowercase collection name used in load notifications.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Company => "companies",
            Self::Contact => "contacts",
            Self::Deal => "deals",
            Self::PipelineStage => "pipeline stages",
        }
    }
}

/// Contract shared by every persisted entity.
///
/// A record is created from a `Draft` (the editable field set submitted by
/// a form) and owns its identity and timestamps.
pub trait Record: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Editable field set used by create/update calls.
    type Draft: Clone
        + Debug
        + Default
        + Send
        + Sync
        + Serialize
        + DeserializeOwned
        + Validate
        + 'static;

    const KIND: EntityKind;

    fn id(&self) -> RecordId;

    /// Builds a new record with store-assigned identity.
    fn from_draft(id: RecordId, draft: Self::Draft, now_ms: i64) -> Self;

    /// Replaces all editable fields, keeping identity and creation time.
    fn apply_draft(&mut self, draft: Self::Draft, now_ms: i64);

    /// Projects the editable fields back into a draft (edit forms).
    fn to_draft(&self) -> Self::Draft;

    /// Name shown in confirmations, notifications and reference cells.
    fn display_name(&self) -> String;

    /// Returns a message when `self` may not coexist with `other` in one
    /// collection (uniqueness constraints).
    fn conflict_with(&self, other: &Self) -> Option<String> {
        let _ = other;
        None
    }

    /// Restores collection-level ordering invariants after a write.
    ///
    /// `moved` names the record that was just inserted or repositioned; it
    /// wins ties against records already holding the same slot.
    fn settle_order(collection: &mut Vec<Self>, moved: Option<RecordId>) {
        let _ = (collection, moved);
    }
}

/// Returns the current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, EntityKind};

    #[test]
    fn clock_is_after_2020() {
        assert!(now_epoch_ms() > 1_577_836_800_000);
    }

    #[test]
    fn kind_tags_are_snake_case() {
        assert_eq!(EntityKind::PipelineStage.as_str(), "pipeline_stage");
        assert_eq!(EntityKind::Deal.label(), "Deal");
    }
}
