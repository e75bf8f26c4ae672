//! In-memory Record Store.
//!
//! # Responsibility
//! - Hold one entity collection inside an owned, constructible instance.
//! - Mimic backend round-trips with an optional artificial latency.
//!
//! # Invariants
//! - Every read returns clones; callers never alias the stored collection.
//! - Ids are assigned monotonically and never reused within one instance.

use super::fixtures::Seed;
use super::{DealStageStore, RecordStore, SearchStore, Searchable, StoreError, StoreResult};
use crate::form::validate::Validate;
use crate::model::deal::Deal;
use crate::model::{now_epoch_ms, EntityKind, Record, RecordId};
use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use tokio::sync::Mutex;

struct MemoryState<R> {
    records: Vec<R>,
    next_id: RecordId,
}

/// Mutex-guarded vector store; the default backend for fixtures and tests.
pub struct MemoryStore<R: Record> {
    state: Mutex<MemoryState<R>>,
    latency: Duration,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self::seeded(Vec::new())
    }

    /// Creates a store holding `records`; new ids continue after the max.
    pub fn seeded(mut records: Vec<R>) -> Self {
        let next_id = records.iter().map(|record| record.id()).max().unwrap_or(0) + 1;
        R::settle_order(&mut records, None);
        Self {
            state: Mutex::new(MemoryState { records, next_id }),
            latency: Duration::ZERO,
        }
    }

    /// Delays every operation by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl<R: Seed> MemoryStore<R> {
    /// Creates a store seeded from the embedded JSON fixtures.
    pub fn from_fixtures() -> StoreResult<Self> {
        Ok(Self::seeded(R::fixtures()?))
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get_all(&self) -> StoreResult<Vec<R>> {
        self.round_trip().await;
        let state = self.state.lock().await;
        Ok(state.records.clone())
    }

    async fn get_by_id(&self, id: RecordId) -> StoreResult<Option<R>> {
        self.round_trip().await;
        let state = self.state.lock().await;
        Ok(state.records.iter().find(|record| record.id() == id).cloned())
    }

    async fn create(&self, draft: R::Draft) -> StoreResult<R> {
        draft.validate()?;
        self.round_trip().await;

        let mut state = self.state.lock().await;
        let id = state.next_id;
        let record = R::from_draft(id, draft, now_epoch_ms());
        ensure_no_conflict(&state.records, &record)?;
        state.next_id += 1;
        state.records.push(record);
        R::settle_order(&mut state.records, Some(id));

        debug!(
            "event=store_write module=store status=ok backend=memory kind={} op=create id={}",
            R::KIND.as_str(),
            id
        );
        find_cloned(&state.records, id)
    }

    async fn update(&self, id: RecordId, draft: R::Draft) -> StoreResult<R> {
        draft.validate()?;
        self.round_trip().await;

        let mut state = self.state.lock().await;
        let index = state
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or(StoreError::NotFound { kind: R::KIND, id })?;
        let mut updated = state.records[index].clone();
        updated.apply_draft(draft, now_epoch_ms());
        ensure_no_conflict(&state.records, &updated)?;
        state.records[index] = updated;
        R::settle_order(&mut state.records, Some(id));

        debug!(
            "event=store_write module=store status=ok backend=memory kind={} op=update id={}",
            R::KIND.as_str(),
            id
        );
        find_cloned(&state.records, id)
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        self.round_trip().await;

        let mut state = self.state.lock().await;
        let Some(index) = state.records.iter().position(|record| record.id() == id) else {
            return Ok(false);
        };
        state.records.remove(index);
        R::settle_order(&mut state.records, None);

        debug!(
            "event=store_write module=store status=ok backend=memory kind={} op=delete id={}",
            R::KIND.as_str(),
            id
        );
        Ok(true)
    }
}

#[async_trait]
impl<R: Searchable> SearchStore<R> for MemoryStore<R> {
    async fn search(&self, text: &str) -> StoreResult<Vec<R>> {
        self.round_trip().await;
        let state = self.state.lock().await;
        Ok(state
            .records
            .iter()
            .filter(|record| record.matches_search(text))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DealStageStore for MemoryStore<Deal> {
    async fn update_stage(&self, id: RecordId, stage: &str) -> StoreResult<Deal> {
        self.round_trip().await;

        let mut state = self.state.lock().await;
        let deal = state
            .records
            .iter_mut()
            .find(|deal| deal.id == id)
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Deal,
                id,
            })?;
        deal.stage = stage.to_string();
        deal.updated_at = now_epoch_ms();
        Ok(deal.clone())
    }
}

fn ensure_no_conflict<R: Record>(records: &[R], candidate: &R) -> StoreResult<()> {
    match records
        .iter()
        .find_map(|existing| candidate.conflict_with(existing))
    {
        Some(message) => Err(StoreError::Conflict(message)),
        None => Ok(()),
    }
}

fn find_cloned<R: Record>(records: &[R], id: RecordId) -> StoreResult<R> {
    records
        .iter()
        .find(|record| record.id() == id)
        .cloned()
        .ok_or(StoreError::NotFound { kind: R::KIND, id })
}
