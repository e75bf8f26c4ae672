//! Record-list page controllers.
//!
//! # Responsibility
//! - Own one page's collection, query state, load state and open form.
//! - Wire the view engine, form controller and reconciler to the stores.
//! - Report every outcome through the injected `Notifier`.
//!
//! # Invariants
//! - Each page exclusively owns its collections.
//! - Every load path keeps its own `LoadState`; one failure never blocks
//!   another.
//! - Failed writes leave the collection unchanged and the form open.

use crate::form::{FormController, SubmitError};
use crate::model::{Record, RecordId};
use crate::notify::{Confirm, Notice, Notifier};
use crate::reconcile::{reconcile, Mutation, ReconcileEffect};
use crate::store::{RecordStore, StoreError};
use crate::view::{compute_view, ListView, Listable, QueryState, StatusFilter};
use log::{error, info};
use std::sync::Arc;
use std::time::Instant;

pub mod companies;
pub mod contacts;
pub mod dashboard;
pub mod deals;

pub use companies::{CompaniesPage, CompanyRow};
pub use contacts::{ContactRow, ContactsPage};
pub use dashboard::DashboardPage;
pub use deals::{DealRow, DealsPage};

/// Progress of one load path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Retry by loading again.
    Failed(String),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Records of one kind loaded from one store.
pub struct Collection<R, S: ?Sized> {
    store: Arc<S>,
    records: Vec<R>,
    state: LoadState,
}

impl<R: Record, S: RecordStore<R> + ?Sized> Collection<R, S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            records: Vec::new(),
            state: LoadState::Idle,
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Replaces the collection with the store's current contents.
    ///
    /// On failure the previous records are kept and the state holds the
    /// error message.
    pub async fn load(&mut self, notifier: &dyn Notifier) -> bool {
        let started_at = Instant::now();
        self.state = LoadState::Loading;
        match self.store.get_all().await {
            Ok(records) => {
                info!(
                    "event=page_load module=page status=ok kind={} backend={} count={} duration_ms={}",
                    R::KIND.as_str(),
                    self.store.backend_tag(),
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                self.records = records;
                self.state = LoadState::Ready;
                true
            }
            Err(err) => {
                error!(
                    "event=page_load module=page status=error kind={} backend={} duration_ms={} error={err}",
                    R::KIND.as_str(),
                    self.store.backend_tag(),
                    started_at.elapsed().as_millis()
                );
                notifier.notify(Notice::error(format!("Failed to load {}", R::KIND.plural())));
                self.state = LoadState::Failed(err.to_string());
                false
            }
        }
    }

    fn apply(&mut self, mutation: Mutation<R>) -> ReconcileEffect {
        reconcile(&mut self.records, mutation)
    }
}

/// List page of one entity kind.
pub struct ListPage<R: Listable, S: ?Sized> {
    collection: Collection<R, S>,
    query: QueryState<R::Field>,
    form: Option<FormController<R>>,
    notifier: Arc<dyn Notifier>,
}

impl<R: Listable, S: RecordStore<R> + ?Sized> ListPage<R, S> {
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            collection: Collection::new(store),
            query: QueryState::new(R::DEFAULT_SORT),
            form: None,
            notifier,
        }
    }

    pub fn records(&self) -> &[R] {
        self.collection.records()
    }

    pub fn load_state(&self) -> &LoadState {
        self.collection.state()
    }

    pub fn store(&self) -> &Arc<S> {
        self.collection.store()
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub async fn load(&mut self) -> bool {
        let notifier = Arc::clone(&self.notifier);
        self.collection.load(notifier.as_ref()).await
    }

    pub fn query(&self) -> &QueryState<R::Field> {
        &self.query
    }

    /// Current page of the collection under the query state.
    pub fn view(&self) -> ListView<'_, R> {
        compute_view(self.collection.records(), &self.query)
    }

    pub fn toggle_sort(&mut self, field: R::Field) {
        self.query.toggle_sort(field);
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.query.set_search_text(text);
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.query.set_status_filter(filter);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.query.go_to_page(page);
    }

    pub fn form(&self) -> Option<&FormController<R>> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut FormController<R>> {
        self.form.as_mut()
    }

    pub fn open_create(&mut self) {
        self.form = Some(FormController::create());
    }

    /// Opens the edit form for `id`; returns false when it is not loaded.
    pub fn open_edit(&mut self, id: RecordId) -> bool {
        match self.records().iter().find(|record| record.id() == id) {
            Some(record) => {
                self.form = Some(FormController::edit(record));
                true
            }
            None => false,
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Submits the open form and reconciles the result.
    ///
    /// Success closes the form; any failure keeps it open.
    pub async fn submit_form(&mut self) -> Result<ReconcileEffect, SubmitError> {
        let Some(form) = self.form.as_mut() else {
            return Err(SubmitError::Closed);
        };
        let store = Arc::clone(&self.collection.store);

        match form.submit(store.as_ref()).await {
            Ok(mutation) => {
                let verb = match &mutation {
                    Mutation::Created(_) => "created",
                    _ => "updated",
                };
                let effect = self.collection.apply(mutation);
                self.form = None;
                self.notifier.notify(Notice::success(format!(
                    "{} {verb} successfully",
                    R::KIND.label()
                )));
                Ok(effect)
            }
            Err(SubmitError::Invalid(errors)) => {
                self.notifier
                    .notify(Notice::warning("Please fix the highlighted fields"));
                Err(SubmitError::Invalid(errors))
            }
            Err(err) => {
                self.notifier.notify(Notice::error(format!(
                    "Failed to save {}: {err}",
                    R::KIND.label().to_lowercase()
                )));
                Err(err)
            }
        }
    }

    /// Deletes `id` after a positive confirmation.
    ///
    /// Returns `Ok(false)` when the user declines (the store is not called)
    /// or when the store had nothing to remove.
    pub async fn delete(&mut self, id: RecordId, confirm: &dyn Confirm) -> Result<bool, StoreError> {
        let subject = self
            .records()
            .iter()
            .find(|record| record.id() == id)
            .map(Record::display_name)
            .unwrap_or_else(|| format!("this {}", R::KIND.label().to_lowercase()));
        if !confirm.confirm(&format!("Are you sure you want to delete {subject}?")) {
            info!(
                "event=record_delete module=page status=cancelled kind={} id={id}",
                R::KIND.as_str()
            );
            return Ok(false);
        }

        match self.collection.store.delete(id).await {
            Ok(true) => {
                self.collection.apply(Mutation::Deleted(id));
                self.notifier.notify(Notice::success(format!(
                    "{} deleted successfully",
                    R::KIND.label()
                )));
                Ok(true)
            }
            Ok(false) => {
                self.notifier
                    .notify(Notice::warning(format!("{} not found", R::KIND.label())));
                Ok(false)
            }
            Err(err) => {
                error!(
                    "event=record_delete module=page status=error kind={} id={id} error={err}",
                    R::KIND.as_str()
                );
                self.notifier.notify(Notice::error(format!(
                    "Failed to delete {}",
                    R::KIND.label().to_lowercase()
                )));
                Err(err)
            }
        }
    }

    /// Merges a mutation produced outside the form (e.g. a kanban move).
    pub fn apply_mutation(&mut self, mutation: Mutation<R>) -> ReconcileEffect {
        self.collection.apply(mutation)
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<R> {
        &mut self.collection.records
    }
}
