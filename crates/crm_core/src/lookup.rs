//! Soft cross-entity reference resolution.
//!
//! Dangling or empty references render as `PLACEHOLDER`; they are never an
//! error at render time.

use crate::model::{Record, RecordId};
use std::collections::HashMap;

/// Text shown for an unresolved reference.
pub const PLACEHOLDER: &str = "-";

/// Read-only id lookup over a loaded collection.
pub trait Lookup<R> {
    fn lookup(&self, id: RecordId) -> Option<&R>;
}

impl<R: Record> Lookup<R> for [R] {
    fn lookup(&self, id: RecordId) -> Option<&R> {
        self.iter().find(|record| record.id() == id)
    }
}

impl<R: Record> Lookup<R> for Vec<R> {
    fn lookup(&self, id: RecordId) -> Option<&R> {
        self.as_slice().lookup(id)
    }
}

/// Hash index over a borrowed collection, for rendering many rows.
#[derive(Debug)]
pub struct RecordIndex<'a, R> {
    by_id: HashMap<RecordId, &'a R>,
}

impl<'a, R: Record> RecordIndex<'a, R> {
    pub fn new(records: &'a [R]) -> Self {
        Self {
            by_id: records.iter().map(|record| (record.id(), record)).collect(),
        }
    }
}

impl<R> Lookup<R> for RecordIndex<'_, R> {
    fn lookup(&self, id: RecordId) -> Option<&R> {
        self.by_id.get(&id).copied()
    }
}

/// Display name of the referenced record, or `PLACEHOLDER`.
pub fn display_ref<R, L>(lookup: &L, id: Option<RecordId>) -> String
where
    R: Record,
    L: Lookup<R> + ?Sized,
{
    id.and_then(|id| lookup.lookup(id))
        .map(Record::display_name)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::{display_ref, RecordIndex, PLACEHOLDER};
    use crate::model::stage::PipelineStage;

    #[test]
    fn dangling_and_empty_references_render_placeholder() {
        let stages = vec![PipelineStage {
            id: 1,
            name: "Lead".to_string(),
            color: String::new(),
            position: 0,
        }];
        let index = RecordIndex::new(&stages);

        assert_eq!(display_ref(&index, Some(1)), "Lead");
        assert_eq!(display_ref(&index, Some(99)), PLACEHOLDER);
        assert_eq!(display_ref(stages.as_slice(), None), PLACEHOLDER);
    }
}
