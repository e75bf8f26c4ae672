//! SQLite bootstrap for the persistent Record Store backend.
//!
//! # Responsibility
//! - Open and configure SQLite connections for CRM tables.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Stores must not read/write records before migrations succeed.
//! - A connection is only handed out after the record schema is verified.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod schema;

pub use open::{open_db, open_db_in_memory, open_shared};
pub use schema::{verify_schema, LIST_INDEXES, RECORD_TABLES};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Migrations report the latest version but a record table or index is absent.
    IncompleteSchema {
        object: &'static str,
        name: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "crm database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::IncompleteSchema { object, name } => {
                write!(f, "crm database is missing {object} `{name}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::IncompleteSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
