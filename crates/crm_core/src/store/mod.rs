//! Record Store contracts and backend implementations.
//!
//! # Responsibility
//! - Define one polymorphic, asynchronous CRUD contract per entity kind.
//! - Normalize backend naming differences at this boundary.
//! - Provide in-memory, SQLite and remote implementations.
//!
//! # Invariants
//! - Write paths validate drafts before touching storage.
//! - `update` on a missing id returns `StoreError::NotFound`.
//! - `delete` returns `Ok(false)` when nothing was removed.
//! - No implementation keeps ambient/global state; every store is an
//!   explicitly constructed instance.

use crate::db::DbError;
use crate::form::validate::ValidationErrors;
use crate::model::company::Company;
use crate::model::contact::Contact;
use crate::model::deal::Deal;
use crate::model::{EntityKind, Record, RecordId};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fixtures;
pub mod memory;
pub mod remote;
pub mod set;
pub mod sqlite;

pub use memory::MemoryStore;
pub use remote::{RemoteError, RemoteSettings, RemoteStore};
pub use set::{SetupError, StoreSet};
pub use sqlite::{SharedConnection, SqliteStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by every Record Store operation.
#[derive(Debug)]
pub enum StoreError {
    NotFound { kind: EntityKind, id: RecordId },
    Validation(ValidationErrors),
    /// Write rejected because it collides with an existing record.
    Conflict(String),
    Db(DbError),
    Remote(RemoteError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    /// Backend handle cannot be used (poisoned lock, closed runtime).
    Unavailable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.label()),
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Remote(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid record data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::Unavailable(details) => write!(f, "store unavailable: {details}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for StoreError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RemoteError> for StoreError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

/// Per-entity persistence contract.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Short backend name used in diagnostics (`memory`, `sqlite`, `remote`).
    fn backend_tag(&self) -> &'static str;

    async fn get_all(&self) -> StoreResult<Vec<R>>;
    async fn get_by_id(&self, id: RecordId) -> StoreResult<Option<R>>;
    async fn create(&self, draft: R::Draft) -> StoreResult<R>;
    async fn update(&self, id: RecordId, draft: R::Draft) -> StoreResult<R>;
    async fn delete(&self, id: RecordId) -> StoreResult<bool>;
}

/// Free-text lookup offered by the contact and company stores.
#[async_trait]
pub trait SearchStore<R: Searchable>: RecordStore<R> {
    async fn search(&self, text: &str) -> StoreResult<Vec<R>>;
}

/// Stage-move operation used by the kanban board.
#[async_trait]
pub trait DealStageStore: RecordStore<Deal> {
    /// Moves one deal to `stage` and returns the stored record.
    ///
    /// The default implementation reads the deal and writes it back through
    /// `update`; backends with a cheaper path override it.
    async fn update_stage(&self, id: RecordId, stage: &str) -> StoreResult<Deal> {
        let current = self.get_by_id(id).await?.ok_or(StoreError::NotFound {
            kind: EntityKind::Deal,
            id,
        })?;
        let mut draft = current.to_draft();
        draft.stage = stage.to_string();
        self.update(id, draft).await
    }
}

/// Records that support the store-level `search` operation.
pub trait Searchable: Record {
    /// Column names matched by persistent/remote backends.
    const SEARCH_COLUMNS: &'static [&'static str];

    /// Field values matched by the in-memory backend, in column order.
    fn search_values(&self) -> Vec<&str>;

    /// Case-insensitive substring match against the search columns.
    fn matches_search(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        self.search_values()
            .iter()
            .any(|value| value.to_lowercase().contains(&needle))
    }
}

impl Searchable for Company {
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "industry"];

    fn search_values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.industry.as_str()]
    }
}

impl Searchable for Contact {
    const SEARCH_COLUMNS: &'static [&'static str] = &["first_name", "last_name", "email"];

    fn search_values(&self) -> Vec<&str> {
        vec![
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{Searchable, StoreError};
    use crate::model::contact::{Contact, ContactStatus};
    use crate::model::EntityKind;

    #[test]
    fn contact_search_ignores_job_title() {
        let contact = Contact {
            id: 1,
            first_name: "Sarah".to_string(),
            last_name: "Johnson".to_string(),
            email: "sarah@techcorp.com".to_string(),
            phone: String::new(),
            job_title: "CTO".to_string(),
            company_id: None,
            status: ContactStatus::Active,
            notes: String::new(),
            created_at: 0,
            updated_at: 0,
        };
        assert!(contact.matches_search("TECHCORP"));
        assert!(!contact.matches_search("cto"));
    }

    #[test]
    fn not_found_message_names_the_entity() {
        let err = StoreError::NotFound {
            kind: EntityKind::Company,
            id: 7,
        };
        assert_eq!(err.to_string(), "Company not found: 7");
    }
}
