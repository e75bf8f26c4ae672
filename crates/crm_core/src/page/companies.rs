//! Companies list page.

use super::{Collection, ListPage};
use crate::lookup::{display_ref, RecordIndex};
use crate::model::company::Company;
use crate::model::contact::Contact;
use crate::notify::Notifier;
use crate::store::{SearchStore, StoreSet};
use std::sync::Arc;

/// Rendered table row with the primary contact resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRow<'a> {
    pub company: &'a Company,
    pub primary_contact: String,
}

pub struct CompaniesPage {
    pub list: ListPage<Company, dyn SearchStore<Company>>,
    pub contacts: Collection<Contact, dyn SearchStore<Contact>>,
}

impl CompaniesPage {
    pub fn new(stores: &StoreSet, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            list: ListPage::new(Arc::clone(&stores.companies), notifier),
            contacts: Collection::new(Arc::clone(&stores.contacts)),
        }
    }

    /// Loads companies and the contact lookup concurrently.
    pub async fn mount(&mut self) {
        let notifier = Arc::clone(self.list.notifier());
        tokio::join!(self.list.load(), self.contacts.load(notifier.as_ref()));
    }

    /// Visible rows of the current page.
    pub fn rows(&self) -> Vec<CompanyRow<'_>> {
        let contacts = RecordIndex::new(self.contacts.records());
        self.list
            .view()
            .page_items
            .into_iter()
            .map(|company| CompanyRow {
                company,
                primary_contact: display_ref(&contacts, company.primary_contact_id),
            })
            .collect()
    }
}
