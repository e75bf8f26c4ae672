//! Contacts list page.

use super::{Collection, ListPage};
use crate::lookup::{display_ref, RecordIndex};
use crate::model::company::Company;
use crate::model::contact::Contact;
use crate::notify::Notifier;
use crate::store::{SearchStore, StoreSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct ContactRow<'a> {
    pub contact: &'a Contact,
    pub company: String,
}

pub struct ContactsPage {
    pub list: ListPage<Contact, dyn SearchStore<Contact>>,
    pub companies: Collection<Company, dyn SearchStore<Company>>,
}

impl ContactsPage {
    pub fn new(stores: &StoreSet, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            list: ListPage::new(Arc::clone(&stores.contacts), notifier),
            companies: Collection::new(Arc::clone(&stores.companies)),
        }
    }

    pub async fn mount(&mut self) {
        let notifier = Arc::clone(self.list.notifier());
        tokio::join!(self.list.load(), self.companies.load(notifier.as_ref()));
    }

    pub fn rows(&self) -> Vec<ContactRow<'_>> {
        let companies = RecordIndex::new(self.companies.records());
        self.list
            .view()
            .page_items
            .into_iter()
            .map(|contact| ContactRow {
                contact,
                company: display_ref(&companies, contact.company_id),
            })
            .collect()
    }
}
