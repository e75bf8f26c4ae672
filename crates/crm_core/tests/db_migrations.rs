use crm_core::db::migrations::latest_version;
use crm_core::db::{
    open_db, open_db_in_memory, verify_schema, DbError, LIST_INDEXES, RECORD_TABLES,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in RECORD_TABLES {
        assert_object_exists(&conn, "table", table);
    }
    for index in LIST_INDEXES {
        assert_object_exists(&conn, "index", index);
    }
    verify_schema(&conn).unwrap();
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crm.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_object_exists(&conn_second, "table", "deals");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn stage_names_are_unique_at_the_schema_level() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO pipeline_stages (name, color, position, created_at, updated_at)
         VALUES ('Lead', '', 0, 0, 0);",
        [],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO pipeline_stages (name, color, position, created_at, updated_at)
         VALUES ('Lead', '', 1, 0, 0);",
        [],
    );
    assert!(duplicate.is_err());
}

#[test]
fn stamped_database_without_record_tables_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stamped.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::IncompleteSchema {
            object: "table",
            name: "companies"
        }
    ));
    assert_eq!(err.to_string(), "crm database is missing table `companies`");
}

#[test]
fn dropped_list_index_fails_verification() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP INDEX idx_deals_stage;").unwrap();

    let err = verify_schema(&conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::IncompleteSchema {
            object: "index",
            name: "idx_deals_stage"
        }
    ));
}

#[test]
fn contact_status_is_limited_to_known_labels() {
    let conn = open_db_in_memory().unwrap();
    let insert = |status: &str| {
        conn.execute(
            "INSERT INTO contacts (first_name, last_name, email, status, created_at, updated_at)
             VALUES ('Ada', 'Lovelace', 'ada@example.com', ?1, 0, 0);",
            [status],
        )
    };

    assert!(insert("Active").is_ok());
    assert!(insert("active").is_err());
    assert!(insert("Archived").is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_object_exists(conn: &Connection, object: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [object, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{object} {name} does not exist");
}
