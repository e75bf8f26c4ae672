//! Mutation Reconciler.
//!
//! # Responsibility
//! - Merge the outcome of a store write into a page's loaded collection
//!   without refetching.
//!
//! # Invariants
//! - Only successful outcomes touch the collection.
//! - Elements are matched by canonical `id` only.
//! - Replacement happens in place; no other element moves.

use crate::model::{Record, RecordId};
use log::debug;

/// Successful store write, carrying what the store returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<R> {
    Created(R),
    Updated(R),
    Deleted(RecordId),
}

/// Change applied to the collection by `reconcile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileEffect {
    Appended,
    Replaced(usize),
    Removed(usize),
    /// A delete for an id the collection does not hold.
    Unchanged,
}

/// Applies one successful mutation to `collection`.
///
/// An update whose id is absent is appended.
pub fn reconcile<R: Record>(collection: &mut Vec<R>, mutation: Mutation<R>) -> ReconcileEffect {
    let effect = match mutation {
        Mutation::Created(record) => {
            collection.push(record);
            ReconcileEffect::Appended
        }
        Mutation::Updated(record) => {
            let id = record.id();
            match collection.iter().position(|existing| existing.id() == id) {
                Some(index) => {
                    collection[index] = record;
                    ReconcileEffect::Replaced(index)
                }
                None => {
                    collection.push(record);
                    ReconcileEffect::Appended
                }
            }
        }
        Mutation::Deleted(id) => match collection.iter().position(|existing| existing.id() == id) {
            Some(index) => {
                collection.remove(index);
                ReconcileEffect::Removed(index)
            }
            None => ReconcileEffect::Unchanged,
        },
    };

    debug!(
        "event=reconcile module=reconcile status=ok kind={} effect={effect:?} len={}",
        R::KIND.as_str(),
        collection.len()
    );
    effect
}

/// Reconciles a store outcome; failures leave `collection` untouched and
/// are handed back to the caller.
pub fn reconcile_outcome<R: Record, E>(
    collection: &mut Vec<R>,
    outcome: Result<Mutation<R>, E>,
) -> Result<ReconcileEffect, E> {
    outcome.map(|mutation| reconcile(collection, mutation))
}

#[cfg(test)]
mod tests {
    use super::{reconcile, reconcile_outcome, Mutation, ReconcileEffect};
    use crate::model::stage::PipelineStage;

    fn stage(id: i64, name: &str) -> PipelineStage {
        PipelineStage {
            id,
            name: name.to_string(),
            color: String::new(),
            position: 0,
        }
    }

    #[test]
    fn update_of_unknown_id_appends() {
        let mut stages = vec![stage(1, "Lead")];
        let effect = reconcile(&mut stages, Mutation::Updated(stage(2, "Won")));
        assert_eq!(effect, ReconcileEffect::Appended);
        assert_eq!(stages.len(), 2);
    }

    #[test]
    fn delete_of_unknown_id_is_a_no_op() {
        let mut stages = vec![stage(1, "Lead")];
        assert_eq!(
            reconcile(&mut stages, Mutation::Deleted(9)),
            ReconcileEffect::Unchanged
        );
        assert_eq!(stages, vec![stage(1, "Lead")]);
    }

    #[test]
    fn failed_outcome_leaves_collection_alone() {
        let mut stages = vec![stage(1, "Lead")];
        let result = reconcile_outcome(&mut stages, Err::<Mutation<PipelineStage>, _>("boom"));
        assert_eq!(result, Err("boom"));
        assert_eq!(stages, vec![stage(1, "Lead")]);
    }
}
