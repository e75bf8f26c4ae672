//! Global search across contacts, companies and deals.
//!
//! # Invariants
//! - Blank queries return no hits and issue no store calls.
//! - Hits are grouped by kind: contacts, then companies, then deals.
//! - A failing kind is logged and skipped; the others still return.

use crate::model::{EntityKind, Record, RecordId};
use crate::store::{StoreResult, StoreSet};
use log::{debug, warn};

/// Hits kept per entity kind.
pub const DEFAULT_HITS_PER_KIND: usize = 3;

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub hits_per_kind: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hits_per_kind: DEFAULT_HITS_PER_KIND,
        }
    }
}

/// Single search hit returned by [`search_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: RecordId,
    pub kind: EntityKind,
    pub title: String,
    /// Secondary line: email, industry or stage.
    pub subtitle: String,
}

/// Runs the three lookups concurrently and merges their first hits.
///
/// Contacts and companies use the store-level `search`; deals are matched
/// by name over `get_all`.
pub async fn search_all(stores: &StoreSet, query: &SearchQuery) -> Vec<SearchHit> {
    let text = query.text.trim();
    if text.is_empty() || query.hits_per_kind == 0 {
        return Vec::new();
    }
    let needle = text.to_lowercase();

    let (contacts, companies, deals) = tokio::join!(
        stores.contacts.search(text),
        stores.companies.search(text),
        stores.deals.get_all(),
    );
    let deals = deals.map(|deals| {
        deals
            .into_iter()
            .filter(|deal| deal.name.to_lowercase().contains(&needle))
            .collect::<Vec<_>>()
    });

    let mut hits = Vec::new();
    collect_hits(&mut hits, contacts, query.hits_per_kind, |contact| {
        contact.email.clone()
    });
    collect_hits(&mut hits, companies, query.hits_per_kind, |company| {
        company.industry.clone()
    });
    collect_hits(&mut hits, deals, query.hits_per_kind, |deal| deal.stage.clone());

    debug!(
        "event=global_search module=search status=ok query_len={} hits={}",
        text.len(),
        hits.len()
    );
    hits
}

fn collect_hits<R: Record>(
    hits: &mut Vec<SearchHit>,
    found: StoreResult<Vec<R>>,
    limit: usize,
    subtitle: impl Fn(&R) -> String,
) {
    match found {
        Ok(records) => hits.extend(records.iter().take(limit).map(|record| SearchHit {
            id: record.id(),
            kind: R::KIND,
            title: record.display_name(),
            subtitle: subtitle(record),
        })),
        Err(err) => warn!(
            "event=global_search module=search status=error kind={} error={err}",
            R::KIND.as_str()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{search_all, SearchQuery};
    use crate::store::StoreSet;
    use std::time::Duration;

    #[tokio::test]
    async fn blank_query_returns_nothing() {
        let stores = StoreSet::in_memory(true, Duration::ZERO).unwrap();
        assert!(search_all(&stores, &SearchQuery::new("   ")).await.is_empty());
    }
}
