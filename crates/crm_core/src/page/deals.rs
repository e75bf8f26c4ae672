//! Deals page: table view plus the kanban board.

use super::{Collection, ListPage};
use crate::kanban::{assign_stage, columns, DragEnd, StageColumn, StageMove};
use crate::lookup::{display_ref, RecordIndex};
use crate::model::company::Company;
use crate::model::contact::Contact;
use crate::model::deal::Deal;
use crate::model::stage::PipelineStage;
use crate::notify::{Notice, Notifier};
use crate::store::{DealStageStore, RecordStore, SearchStore, StoreResult, StoreSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct DealRow<'a> {
    pub deal: &'a Deal,
    pub contact: String,
    pub company: String,
}

pub struct DealsPage {
    pub list: ListPage<Deal, dyn DealStageStore>,
    pub stages: Collection<PipelineStage, dyn RecordStore<PipelineStage>>,
    pub contacts: Collection<Contact, dyn SearchStore<Contact>>,
    pub companies: Collection<Company, dyn SearchStore<Company>>,
}

impl DealsPage {
    pub fn new(stores: &StoreSet, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            list: ListPage::new(Arc::clone(&stores.deals), notifier),
            stages: Collection::new(Arc::clone(&stores.stages)),
            contacts: Collection::new(Arc::clone(&stores.contacts)),
            companies: Collection::new(Arc::clone(&stores.companies)),
        }
    }

    /// Loads deals, stages, contacts and companies concurrently.
    pub async fn mount(&mut self) {
        let notifier = Arc::clone(self.list.notifier());
        tokio::join!(
            self.list.load(),
            self.stages.load(notifier.as_ref()),
            self.contacts.load(notifier.as_ref()),
            self.companies.load(notifier.as_ref()),
        );
    }

    pub fn rows(&self) -> Vec<DealRow<'_>> {
        let contacts = RecordIndex::new(self.contacts.records());
        let companies = RecordIndex::new(self.companies.records());
        self.list
            .view()
            .page_items
            .into_iter()
            .map(|deal| DealRow {
                deal,
                contact: display_ref(&contacts, deal.contact_id),
                company: display_ref(&companies, deal.company_id),
            })
            .collect()
    }

    /// Kanban columns over the loaded deals.
    pub fn board(&self) -> Vec<StageColumn<'_>> {
        columns(self.stages.records(), self.list.records())
    }

    /// Handles a drag-end on the kanban board.
    pub async fn move_deal(&mut self, drag: &DragEnd) -> StoreResult<StageMove> {
        let store = Arc::clone(self.list.store());
        let notifier = Arc::clone(self.list.notifier());
        let outcome = assign_stage(
            store.as_ref(),
            self.list.records_mut(),
            self.stages.records(),
            drag,
        )
        .await;

        match &outcome {
            Ok(StageMove::Moved { deal, .. }) => {
                notifier.notify(Notice::success(format!("Deal moved to {}", deal.stage)));
            }
            Ok(_) => {}
            Err(_) => notifier.notify(Notice::error("Failed to update deal stage")),
        }
        outcome
    }
}
