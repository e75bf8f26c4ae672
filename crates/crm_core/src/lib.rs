//! Core domain logic for the CRM.
//! This crate is the single source of truth for record invariants, list
//! rendering and store access.

pub mod config;
pub mod dashboard;
pub mod db;
pub mod form;
pub mod kanban;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod notify;
pub mod page;
pub mod reconcile;
pub mod search;
pub mod store;
pub mod view;

pub use config::{Backend, ConfigError, CrmConfig};
pub use form::validate::{Validate, ValidationErrors};
pub use form::{FormController, FormMode, SubmitError};
pub use kanban::{assign_stage, DragEnd, DropTarget, StageMove};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::company::{Company, CompanyDraft};
pub use model::contact::{Contact, ContactDraft, ContactStatus};
pub use model::deal::{Deal, DealDraft};
pub use model::stage::{PipelineStage, PipelineStageDraft};
pub use model::{EntityKind, Record, RecordId};
pub use reconcile::{reconcile, Mutation, ReconcileEffect};
pub use search::{search_all, SearchHit, SearchQuery};
pub use store::{
    DealStageStore, MemoryStore, RecordStore, SearchStore, SqliteStore, StoreError, StoreResult,
    StoreSet,
};
pub use view::{compute_view, ListView, QueryState, SortDirection, StatusFilter, PAGE_SIZE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
