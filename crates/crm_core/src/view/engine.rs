//! Search, filter, sort and paginate pipeline.

use super::fields::{Listable, SortKey};
use super::query::{QueryState, SortDirection, StatusFilter};

/// One rendered page plus the totals needed for pagination controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<'a, R> {
    pub page_items: Vec<&'a R>,
    /// Records left after search and status filtering.
    pub total_count: usize,
    /// At least 1, even for an empty result.
    pub total_pages: usize,
}

/// Computes the visible page of `records` for `query`.
///
/// Pure: the input slice is never reordered and equal keys keep their
/// input order.
pub fn compute_view<'a, R: Listable>(
    records: &'a [R],
    query: &QueryState<R::Field>,
) -> ListView<'a, R> {
    let needle = query.search_text.to_lowercase();

    let mut keyed: Vec<(SortKey, &'a R)> = records
        .iter()
        .filter(|record| record.matches_text(&needle))
        .filter(|record| match &query.status_filter {
            StatusFilter::All => true,
            StatusFilter::Only(status) => record.status().map_or(true, |value| value == status),
        })
        .map(|record| (record.sort_key(query.sort_field), record))
        .collect();

    match query.sort_direction {
        SortDirection::Asc => keyed.sort_by(|left, right| left.0.cmp(&right.0)),
        SortDirection::Desc => keyed.sort_by(|left, right| right.0.cmp(&left.0)),
    }

    let page_size = query.page_size.max(1);
    let total_count = keyed.len();
    let total_pages = total_count.div_ceil(page_size).max(1);
    let start = query.page.saturating_sub(1).saturating_mul(page_size);

    ListView {
        page_items: keyed
            .into_iter()
            .skip(start)
            .take(page_size)
            .map(|(_, record)| record)
            .collect(),
        total_count,
        total_pages,
    }
}
