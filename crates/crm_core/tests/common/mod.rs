#![allow(dead_code)]

use async_trait::async_trait;
use crm_core::store::{DealStageStore, RecordStore, SearchStore, Searchable};
use crm_core::{Deal, Record, RecordId, StoreError, StoreResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Store double that counts calls and serves or rejects a fixed collection.
pub struct ScriptedStore<R> {
    records: Mutex<Vec<R>>,
    fail_reads: bool,
    fail_writes: bool,
    calls: AtomicUsize,
}

impl<R: Record> ScriptedStore<R> {
    pub fn serving(records: Vec<R>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_reads: false,
            fail_writes: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting_writes(records: Vec<R>) -> Self {
        Self {
            fail_writes: true,
            ..Self::serving(records)
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Self::serving(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self, write: bool) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if (write && self.fail_writes) || (!write && self.fail_reads) {
            return Err(StoreError::Unavailable("scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for ScriptedStore<R> {
    fn backend_tag(&self) -> &'static str {
        "scripted"
    }

    async fn get_all(&self) -> StoreResult<Vec<R>> {
        self.record_call(false)?;
        Ok(self.records.lock().unwrap().clone())
    }

    async fn get_by_id(&self, id: RecordId) -> StoreResult<Option<R>> {
        self.record_call(false)?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id() == id)
            .cloned())
    }

    async fn create(&self, draft: R::Draft) -> StoreResult<R> {
        self.record_call(true)?;
        let mut records = self.records.lock().unwrap();
        let id = records.iter().map(Record::id).max().unwrap_or(0) + 1;
        let record = R::from_draft(id, draft, 0);
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: RecordId, draft: R::Draft) -> StoreResult<R> {
        self.record_call(true)?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or(StoreError::NotFound { kind: R::KIND, id })?;
        record.apply_draft(draft, 0);
        Ok(record.clone())
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        self.record_call(true)?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|record| record.id() != id);
        Ok(records.len() != before)
    }
}

#[async_trait]
impl<R: Searchable> SearchStore<R> for ScriptedStore<R> {
    async fn search(&self, text: &str) -> StoreResult<Vec<R>> {
        self.record_call(false)?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.matches_search(text))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DealStageStore for ScriptedStore<Deal> {}
