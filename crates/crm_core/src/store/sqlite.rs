//! SQLite-backed Record Store.
//!
//! # Responsibility
//! - Persist the four entity kinds in typed tables (see `db::migrations`).
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate drafts before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Writes and their ordering hooks run inside one transaction.

use super::{DealStageStore, RecordStore, SearchStore, Searchable, StoreError, StoreResult};
use crate::form::validate::Validate;
use crate::model::company::Company;
use crate::model::contact::{Contact, ContactStatus};
use crate::model::deal::Deal;
use crate::model::stage::{compact_positions, PipelineStage, APPEND_POSITION};
use crate::model::{now_epoch_ms, EntityKind, Record, RecordId};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row, Transaction};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

/// Connection shared by the per-entity SQLite stores of one database.
pub type SharedConnection = Arc<Mutex<Connection>>;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Table mapping for one record type.
pub trait SqlRecord: Record {
    const TABLE: &'static str;
    /// Editable columns, in the order produced by `column_values`.
    const COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str = "id ASC";

    fn column_values(&self) -> Vec<Value>;
    fn timestamps(&self) -> (i64, i64);
    fn from_row(row: &Row<'_>) -> StoreResult<Self>;

    /// Runs after every insert/update/delete inside the write transaction.
    fn after_write(tx: &Transaction<'_>, moved: Option<RecordId>) -> StoreResult<()> {
        let _ = (tx, moved);
        Ok(())
    }
}

/// Record Store over one table of a shared SQLite connection.
pub struct SqliteStore<R: SqlRecord> {
    conn: SharedConnection,
    _record: PhantomData<fn() -> R>,
}

impl<R: SqlRecord> SqliteStore<R> {
    /// Constructs a store from a migrated connection.
    ///
    /// Fails with `MissingRequiredTable` when the schema is not in place.
    pub fn try_new(conn: SharedConnection) -> StoreResult<Self> {
        let store = Self {
            conn,
            _record: PhantomData,
        };
        store.with_conn(|conn| {
            if table_exists(conn, R::TABLE)? {
                Ok(())
            } else {
                Err(StoreError::MissingRequiredTable(R::TABLE))
            }
        })?;
        Ok(store)
    }

    /// Inserts `records` keeping their ids, when the table is empty.
    ///
    /// Returns the number of imported rows (zero when data already exists).
    pub fn seed_if_empty(&self, records: &[R]) -> StoreResult<usize> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {};", R::TABLE), [], |row| {
                    row.get(0)
                })?;
            if count > 0 {
                return Ok(0);
            }

            let tx = conn.transaction()?;
            let sql = insert_sql::<R>(true);
            for record in records {
                let (created_at, updated_at) = record.timestamps();
                let mut values = vec![Value::Integer(record.id())];
                values.extend(record.column_values());
                values.push(Value::Integer(created_at));
                values.push(Value::Integer(updated_at));
                tx.execute(&sql, params_from_iter(values))
                    .map_err(map_write_error)?;
            }
            R::after_write(&tx, None)?;
            tx.commit()?;
            Ok(records.len())
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> StoreResult<T>) -> StoreResult<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned"))?;
        f(&mut conn)
    }
}

#[async_trait]
impl<R: SqlRecord> RecordStore<R> for SqliteStore<R> {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn get_all(&self) -> StoreResult<Vec<R>> {
        self.with_conn(|conn| {
            let sql = format!("{} ORDER BY {};", select_sql::<R>(), R::ORDER_BY);
            query_records(conn, &sql, Vec::new())
        })
    }

    async fn get_by_id(&self, id: RecordId) -> StoreResult<Option<R>> {
        self.with_conn(|conn| load_one::<R>(conn, id))
    }

    async fn create(&self, draft: R::Draft) -> StoreResult<R> {
        draft.validate()?;
        let now = now_epoch_ms();
        // SQLite assigns the id; the placeholder is never written.
        let record = R::from_draft(0, draft, now);

        let created = self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut values = record.column_values();
            values.push(Value::Integer(now));
            values.push(Value::Integer(now));
            tx.execute(&insert_sql::<R>(false), params_from_iter(values))
                .map_err(map_write_error)?;
            let id = tx.last_insert_rowid();
            R::after_write(&tx, Some(id))?;
            tx.commit()?;
            load_one::<R>(conn, id)?.ok_or(StoreError::InvalidData(format!(
                "created {} {id} not found in read-back",
                R::KIND.as_str()
            )))
        });

        log_write::<R>("create", &created);
        created
    }

    async fn update(&self, id: RecordId, draft: R::Draft) -> StoreResult<R> {
        draft.validate()?;
        let now = now_epoch_ms();

        let updated = self.with_conn(|conn| {
            let mut record =
                load_one::<R>(conn, id)?.ok_or(StoreError::NotFound { kind: R::KIND, id })?;
            record.apply_draft(draft, now);

            let assignments = R::COLUMNS
                .iter()
                .enumerate()
                .map(|(index, column)| format!("{column} = ?{}", index + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE {} SET {assignments}, updated_at = ?{} WHERE id = ?{};",
                R::TABLE,
                R::COLUMNS.len() + 1,
                R::COLUMNS.len() + 2
            );
            let mut values = record.column_values();
            values.push(Value::Integer(now));
            values.push(Value::Integer(id));

            let tx = conn.transaction()?;
            let changed = tx
                .execute(&sql, params_from_iter(values))
                .map_err(map_write_error)?;
            if changed == 0 {
                return Err(StoreError::NotFound { kind: R::KIND, id });
            }
            R::after_write(&tx, Some(id))?;
            tx.commit()?;
            load_one::<R>(conn, id)?.ok_or(StoreError::NotFound { kind: R::KIND, id })
        });

        log_write::<R>("update", &updated);
        updated
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                &format!("DELETE FROM {} WHERE id = ?1;", R::TABLE),
                [id],
            )?;
            if changed > 0 {
                R::after_write(&tx, None)?;
            }
            tx.commit()?;
            debug!(
                "event=store_write module=store status=ok backend=sqlite kind={} op=delete id={} removed={}",
                R::KIND.as_str(),
                id,
                changed > 0
            );
            Ok(changed > 0)
        })
    }
}

#[async_trait]
impl<R: SqlRecord + Searchable> SearchStore<R> for SqliteStore<R> {
    async fn search(&self, text: &str) -> StoreResult<Vec<R>> {
        let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
        let predicate = R::SEARCH_COLUMNS
            .iter()
            .map(|column| format!("lower({column}) LIKE ?1 ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!(
            "{} WHERE {predicate} ORDER BY {};",
            select_sql::<R>(),
            R::ORDER_BY
        );
        self.with_conn(|conn| query_records(conn, &sql, vec![Value::Text(pattern)]))
    }
}

#[async_trait]
impl DealStageStore for SqliteStore<Deal> {
    async fn update_stage(&self, id: RecordId, stage: &str) -> StoreResult<Deal> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE deals SET stage = ?1, updated_at = ?2 WHERE id = ?3;",
                params![stage, now_epoch_ms(), id],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound {
                    kind: EntityKind::Deal,
                    id,
                });
            }
            load_one::<Deal>(conn, id)?.ok_or(StoreError::NotFound {
                kind: EntityKind::Deal,
                id,
            })
        })
    }
}

impl SqlRecord for Company {
    const TABLE: &'static str = "companies";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "industry",
        "website",
        "phone",
        "address",
        "revenue",
        "primary_contact_id",
        "notes",
    ];

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.industry.clone()),
            Value::Text(self.website.clone()),
            Value::Text(self.phone.clone()),
            Value::Text(self.address.clone()),
            Value::Real(self.revenue),
            optional_id(self.primary_contact_id),
            Value::Text(self.notes.clone()),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (self.created_at, self.updated_at)
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            industry: row.get("industry")?,
            website: row.get("website")?,
            phone: row.get("phone")?,
            address: row.get("address")?,
            revenue: row.get("revenue")?,
            primary_contact_id: row.get("primary_contact_id")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl SqlRecord for Contact {
    const TABLE: &'static str = "contacts";
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "email",
        "phone",
        "job_title",
        "company_id",
        "status",
        "notes",
    ];

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.first_name.clone()),
            Value::Text(self.last_name.clone()),
            Value::Text(self.email.clone()),
            Value::Text(self.phone.clone()),
            Value::Text(self.job_title.clone()),
            optional_id(self.company_id),
            Value::Text(self.status.as_str().to_string()),
            Value::Text(self.notes.clone()),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (self.created_at, self.updated_at)
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let status_text: String = row.get("status")?;
        let status = status_text.parse::<ContactStatus>().map_err(|_| {
            StoreError::InvalidData(format!(
                "invalid contact status `{status_text}` in contacts.status"
            ))
        })?;

        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            job_title: row.get("job_title")?,
            company_id: row.get("company_id")?,
            status,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl SqlRecord for Deal {
    const TABLE: &'static str = "deals";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "amount",
        "stage",
        "close_date",
        "contact_id",
        "company_id",
        "owner",
        "notes",
    ];

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Real(self.amount),
            Value::Text(self.stage.clone()),
            self.close_date
                .map(|date| Value::Text(date.format(DATE_FORMAT).to_string()))
                .unwrap_or(Value::Null),
            optional_id(self.contact_id),
            optional_id(self.company_id),
            self.owner.clone().map(Value::Text).unwrap_or(Value::Null),
            Value::Text(self.notes.clone()),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (self.created_at, self.updated_at)
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let close_date = match row.get::<_, Option<String>>("close_date")? {
            Some(text) => Some(NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
                StoreError::InvalidData(format!("invalid close date `{text}` in deals.close_date"))
            })?),
            None => None,
        };

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            amount: row.get("amount")?,
            stage: row.get("stage")?,
            close_date,
            contact_id: row.get("contact_id")?,
            company_id: row.get("company_id")?,
            owner: row.get("owner")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl SqlRecord for PipelineStage {
    const TABLE: &'static str = "pipeline_stages";
    const COLUMNS: &'static [&'static str] = &["name", "color", "position"];
    const ORDER_BY: &'static str = "position ASC, id ASC";

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.color.clone()),
            Value::Integer(i64::from(self.position)),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (0, 0)
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let position: i64 = row.get("position")?;
        let position = u32::try_from(position).map_err(|_| {
            StoreError::InvalidData(format!(
                "invalid position `{position}` in pipeline_stages.position"
            ))
        })?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            position,
        })
    }

    fn after_write(tx: &Transaction<'_>, moved: Option<RecordId>) -> StoreResult<()> {
        let sql = format!(
            "{} ORDER BY {};",
            select_sql::<PipelineStage>(),
            PipelineStage::ORDER_BY
        );
        let mut stages: Vec<PipelineStage> = query_records(tx, &sql, Vec::new())?;
        for id in compact_positions(&mut stages, moved) {
            let position = stages
                .iter()
                .find(|stage| stage.id == id)
                .map_or(APPEND_POSITION, |stage| stage.position);
            tx.execute(
                "UPDATE pipeline_stages SET position = ?1 WHERE id = ?2;",
                params![i64::from(position), id],
            )?;
        }
        Ok(())
    }
}

fn select_sql<R: SqlRecord>() -> String {
    format!(
        "SELECT id, {}, created_at, updated_at FROM {}",
        R::COLUMNS.join(", "),
        R::TABLE
    )
}

fn insert_sql<R: SqlRecord>(with_id: bool) -> String {
    let mut columns: Vec<&str> = Vec::with_capacity(R::COLUMNS.len() + 3);
    if with_id {
        columns.push("id");
    }
    columns.extend_from_slice(R::COLUMNS);
    columns.push("created_at");
    columns.push("updated_at");

    let placeholders = (1..=columns.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({placeholders});",
        R::TABLE,
        columns.join(", ")
    )
}

fn load_one<R: SqlRecord>(conn: &Connection, id: RecordId) -> StoreResult<Option<R>> {
    let sql = format!("{} WHERE id = ?1;", select_sql::<R>());
    Ok(query_records(conn, &sql, vec![Value::Integer(id)])?
        .into_iter()
        .next())
}

fn query_records<R: SqlRecord>(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> StoreResult<Vec<R>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(R::from_row(row)?);
    }
    Ok(records)
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn map_write_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict(message.clone().unwrap_or_else(|| err.to_string()))
        }
        _ => err.into(),
    }
}

fn log_write<R: SqlRecord>(op: &str, result: &StoreResult<R>) {
    match result {
        Ok(record) => debug!(
            "event=store_write module=store status=ok backend=sqlite kind={} op={op} id={}",
            R::KIND.as_str(),
            record.id()
        ),
        Err(err) => error!(
            "event=store_write module=store status=error backend=sqlite kind={} op={op} error={err}",
            R::KIND.as_str()
        ),
    }
}

fn optional_id(id: Option<RecordId>) -> Value {
    id.map(Value::Integer).unwrap_or(Value::Null)
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_like, insert_sql};
    use crate::model::stage::PipelineStage;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }

    #[test]
    fn insert_sql_binds_every_column() {
        assert_eq!(
            insert_sql::<PipelineStage>(true),
            "INSERT INTO pipeline_stages (id, name, color, position, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6);"
        );
    }
}
