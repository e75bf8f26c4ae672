//! Post-migration check of the CRM record schema.
//!
//! # Invariants
//! - Every record table and list index named here exists once
//!   `verify_schema` returns `Ok`.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Tables backing the four record collections, in entity order.
pub const RECORD_TABLES: [&str; 4] = ["companies", "contacts", "deals", "pipeline_stages"];

/// Indexes serving contact-by-company joins, stage grouping and column order.
pub const LIST_INDEXES: [&str; 3] = [
    "idx_contacts_company_id",
    "idx_deals_stage",
    "idx_pipeline_stages_position",
];

/// Confirms the record tables and list indexes are present.
///
/// A database stamped with the latest `user_version` but missing objects is
/// rejected instead of failing later inside a store query.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    for table in RECORD_TABLES {
        if !object_exists(conn, "table", table)? {
            return Err(DbError::IncompleteSchema {
                object: "table",
                name: table,
            });
        }
    }
    for index in LIST_INDEXES {
        if !object_exists(conn, "index", index)? {
            return Err(DbError::IncompleteSchema {
                object: "index",
                name: index,
            });
        }
    }
    Ok(())
}

fn object_exists(conn: &Connection, object: &str, name: &str) -> DbResult<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2);",
        [object, name],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}
