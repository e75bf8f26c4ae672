//! Hosted-backend Record Store client.
//!
//! # Responsibility
//! - Translate store calls into the backend's table endpoints.
//! - Normalize backend row naming (`Id`, `Name`, `CreatedOn`, lookup
//!   objects, date-time close dates) into the canonical record layout.
//!
//! # Invariants
//! - Every response envelope is checked for `success` before its payload
//!   is used.
//! - Per-record failures surface their field messages as
//!   `"<field label>: <message>"`.

use super::{DealStageStore, RecordStore, SearchStore, Searchable, StoreError, StoreResult};
use crate::form::validate::Validate;
use crate::model::company::Company;
use crate::model::contact::{Contact, ContactDraft};
use crate::model::deal::Deal;
use crate::model::stage::PipelineStage;
use crate::model::{Record, RecordId};
use async_trait::async_trait;
use chrono::DateTime;
use log::{debug, error, warn};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

const PROJECT_HEADER: &str = "X-Project-Id";
const PUBLIC_KEY_HEADER: &str = "X-Public-Key";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
}

/// Error raised by the remote client before a record reaches the caller.
#[derive(Debug)]
pub enum RemoteError {
    Transport(reqwest::Error),
    /// Envelope-level `success: false`.
    Rejected { message: String },
    /// Every record in a write was rejected.
    RecordFailed { messages: Vec<String> },
    Decode(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "remote request failed: {err}"),
            Self::Rejected { message } => write!(f, "remote backend rejected request: {message}"),
            Self::RecordFailed { messages } => {
                write!(f, "remote backend rejected record: {}", messages.join("; "))
            }
            Self::Decode(message) => write!(f, "invalid remote response: {message}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// Backend table mapping for one record type.
pub trait RemoteRecord: Record {
    const TABLE: &'static str;
    /// Columns requested on every fetch.
    const FIELDS: &'static [&'static str];

    /// Value written to the backend's `Name` column when the record has no
    /// `name` field of its own.
    fn wire_name(draft: &Self::Draft) -> Option<String> {
        let _ = draft;
        None
    }
}

impl RemoteRecord for Company {
    const TABLE: &'static str = "company";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "CreatedOn",
        "ModifiedOn",
        "industry",
        "website",
        "phone",
        "address",
        "revenue",
        "primary_contact_id",
        "notes",
    ];
}

impl RemoteRecord for Contact {
    const TABLE: &'static str = "contact";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "CreatedOn",
        "ModifiedOn",
        "first_name",
        "last_name",
        "email",
        "phone",
        "job_title",
        "company_id",
        "status",
        "notes",
    ];

    fn wire_name(draft: &ContactDraft) -> Option<String> {
        Some(format!("{} {}", draft.first_name, draft.last_name))
    }
}

impl RemoteRecord for Deal {
    const TABLE: &'static str = "deal";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "Owner",
        "CreatedOn",
        "ModifiedOn",
        "amount",
        "stage",
        "close_date",
        "contact_id",
        "company_id",
        "notes",
    ];
}

impl RemoteRecord for PipelineStage {
    const TABLE: &'static str = "pipeline_stage";
    const FIELDS: &'static [&'static str] = &["Name", "color", "position"];
}

/// Record Store backed by the hosted backend's table API.
pub struct RemoteStore<R: RemoteRecord> {
    client: reqwest::Client,
    settings: Arc<RemoteSettings>,
    _record: PhantomData<fn() -> R>,
}

impl<R: RemoteRecord> RemoteStore<R> {
    pub fn new(client: reqwest::Client, settings: Arc<RemoteSettings>) -> Self {
        Self {
            client,
            settings,
            _record: PhantomData,
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/tables/{}/{suffix}",
            self.settings.base_url.trim_end_matches('/'),
            R::TABLE
        )
    }

    fn request(&self, method: reqwest::Method, suffix: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(suffix))
            .header("Accept", "application/json")
            .header(PROJECT_HEADER, &self.settings.project_id)
            .header(PUBLIC_KEY_HEADER, &self.settings.public_key)
    }

    async fn send(&self, builder: reqwest::RequestBuilder, op: &str) -> Result<Envelope, RemoteError> {
        let result = async {
            let response = builder.send().await?.error_for_status()?;
            Ok::<_, RemoteError>(response.json::<Envelope>().await?)
        }
        .await;

        match &result {
            Ok(envelope) => debug!(
                "event=remote_call module=store status=ok table={} op={op} success={}",
                R::TABLE,
                envelope.success
            ),
            Err(err) => error!(
                "event=remote_call module=store status=error table={} op={op} error={err}",
                R::TABLE
            ),
        }
        result
    }

    async fn fetch(&self, body: Value) -> StoreResult<Vec<R>> {
        let envelope = self
            .send(self.request(reqwest::Method::POST, "fetch").json(&body), "fetch")
            .await?;
        match envelope.into_data()? {
            Some(Value::Array(rows)) => rows.into_iter().map(decode_row::<R>).collect(),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(RemoteError::Decode(format!(
                "expected row array from {} fetch, got {other}",
                R::TABLE
            ))
            .into()),
        }
    }

    async fn write(
        &self,
        method: reqwest::Method,
        record: Map<String, Value>,
        op: &str,
    ) -> Result<R, RemoteError> {
        let body = json!({ "records": [Value::Object(record)] });
        let envelope = self
            .send(self.request(method, "records").json(&body), op)
            .await?;
        decode_value::<R>(envelope.first_success()?)
    }
}

#[async_trait]
impl<R: RemoteRecord> RecordStore<R> for RemoteStore<R> {
    fn backend_tag(&self) -> &'static str {
        "remote"
    }

    async fn get_all(&self) -> StoreResult<Vec<R>> {
        self.fetch(json!({ "fields": R::FIELDS })).await
    }

    async fn get_by_id(&self, id: RecordId) -> StoreResult<Option<R>> {
        let envelope = self
            .send(
                self.request(reqwest::Method::GET, &format!("records/{id}")),
                "get_by_id",
            )
            .await?;
        match envelope.into_data()? {
            Some(Value::Null) | None => Ok(None),
            Some(row) => decode_row::<R>(row).map(Some),
        }
    }

    async fn create(&self, draft: R::Draft) -> StoreResult<R> {
        draft.validate()?;
        let record = wire_record::<R>(&draft, None)?;
        Ok(self.write(reqwest::Method::POST, record, "create").await?)
    }

    async fn update(&self, id: RecordId, draft: R::Draft) -> StoreResult<R> {
        draft.validate()?;
        let record = wire_record::<R>(&draft, Some(id))?;
        match self.write(reqwest::Method::PUT, record, "update").await {
            Ok(updated) => Ok(updated),
            Err(err @ RemoteError::RecordFailed { .. }) => {
                // A rejected update of a vanished row is reported as missing.
                if self.get_by_id(id).await?.is_none() {
                    Err(StoreError::NotFound { kind: R::KIND, id })
                } else {
                    Err(err.into())
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let body = json!({ "RecordIds": [id] });
        let envelope = self
            .send(
                self.request(reqwest::Method::DELETE, "records").json(&body),
                "delete",
            )
            .await?;
        Ok(envelope.any_record_succeeded(R::TABLE)?)
    }
}

#[async_trait]
impl<R: RemoteRecord + Searchable> SearchStore<R> for RemoteStore<R> {
    async fn search(&self, text: &str) -> StoreResult<Vec<R>> {
        self.fetch(search_body::<R>(text)).await
    }
}

impl DealStageStore for RemoteStore<Deal> {}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    results: Option<Vec<RecordResult>>,
}

#[derive(Debug, Deserialize)]
struct RecordResult {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldError {
    field_label: String,
    message: String,
}

impl RecordResult {
    fn messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self
            .errors
            .iter()
            .map(|err| format!("{}: {}", err.field_label, err.message))
            .collect();
        if let Some(message) = &self.message {
            messages.push(message.clone());
        }
        messages
    }
}

impl Envelope {
    fn ensure_success(&self) -> Result<(), RemoteError> {
        if self.success {
            Ok(())
        } else {
            Err(RemoteError::Rejected {
                message: self
                    .message
                    .clone()
                    .unwrap_or_else(|| "request failed".to_string()),
            })
        }
    }

    fn into_data(self) -> Result<Option<Value>, RemoteError> {
        self.ensure_success()?;
        Ok(self.data)
    }

    /// Returns the first successful record of a write response.
    fn first_success(self) -> Result<Value, RemoteError> {
        self.ensure_success()?;
        let Some(results) = self.results else {
            return self
                .data
                .ok_or_else(|| RemoteError::Decode("write response without results".to_string()));
        };

        let mut messages = Vec::new();
        for result in results {
            if result.success {
                if let Some(data) = result.data {
                    return Ok(data);
                }
            } else {
                messages.extend(result.messages());
            }
        }
        Err(RemoteError::RecordFailed { messages })
    }

    fn any_record_succeeded(self, table: &str) -> Result<bool, RemoteError> {
        self.ensure_success()?;
        let Some(results) = self.results else {
            return Ok(true);
        };
        for failed in results.iter().filter(|result| !result.success) {
            warn!(
                "event=remote_call module=store status=error table={table} op=delete error={}",
                failed.messages().join("; ")
            );
        }
        Ok(results.iter().any(|result| result.success))
    }
}

/// Serializes a draft into one backend write row.
fn wire_record<R: RemoteRecord>(
    draft: &R::Draft,
    id: Option<RecordId>,
) -> StoreResult<Map<String, Value>> {
    let mut record = match serde_json::to_value(draft) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(StoreError::InvalidData(format!(
                "{} draft serialized to non-object {other}",
                R::KIND.as_str()
            )))
        }
        Err(err) => return Err(StoreError::InvalidData(err.to_string())),
    };

    if let Some(name) = record.remove("name") {
        record.insert("Name".to_string(), name);
    }
    if let Some(owner) = record.remove("owner") {
        record.insert("Owner".to_string(), owner);
    }
    if let Some(name) = R::wire_name(draft) {
        record.insert("Name".to_string(), Value::String(name));
    }
    if let Some(id) = id {
        record.insert("Id".to_string(), Value::from(id));
    }
    Ok(record)
}

fn search_body<R: RemoteRecord + Searchable>(text: &str) -> Value {
    let sub_groups: Vec<Value> = R::SEARCH_COLUMNS
        .iter()
        .map(|column| {
            json!({
                "conditions": [{
                    "FieldName": column,
                    "Operator": "Contains",
                    "Values": [text],
                }],
                "operator": "",
            })
        })
        .collect();
    json!({
        "fields": R::FIELDS,
        "whereGroups": [{ "operator": "OR", "SubGroups": sub_groups }],
    })
}

fn decode_row<R: RemoteRecord>(row: Value) -> StoreResult<R> {
    Ok(decode_value::<R>(row)?)
}

fn decode_value<R: RemoteRecord>(row: Value) -> Result<R, RemoteError> {
    serde_json::from_value(normalize_row(row))
        .map_err(|err| RemoteError::Decode(format!("{} row: {err}", R::KIND.as_str())))
}

/// Maps one backend row onto the canonical snake_case record layout.
///
/// Nulls are dropped so record defaults apply.
fn normalize_row(row: Value) -> Value {
    let Value::Object(fields) = row else {
        return row;
    };

    let mut normalized = Map::new();
    for (key, value) in fields {
        if value.is_null() {
            continue;
        }
        match key.as_str() {
            "Id" => {
                normalized.insert("id".to_string(), value);
            }
            "Name" => {
                normalized.entry("name").or_insert(value);
            }
            "name" => {
                normalized.insert(key, value);
            }
            "CreatedOn" => {
                if let Some(ms) = timestamp_ms(&value) {
                    normalized.insert("created_at".to_string(), Value::from(ms));
                }
            }
            "ModifiedOn" => {
                if let Some(ms) = timestamp_ms(&value) {
                    normalized.insert("updated_at".to_string(), Value::from(ms));
                }
            }
            "Owner" => {
                if let Some(owner) = lookup_name(&value) {
                    normalized.insert("owner".to_string(), Value::String(owner));
                }
            }
            "close_date" => {
                normalized.insert(key, date_only(value));
            }
            _ if key.ends_with("_id") => {
                if let Some(id) = lookup_id(&value) {
                    normalized.insert(key, Value::from(id));
                }
            }
            _ => {
                normalized.insert(key, value);
            }
        }
    }
    Value::Object(normalized)
}

fn timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|parsed| parsed.timestamp_millis()),
        _ => None,
    }
}

/// Reference columns arrive as a bare id, a numeric string, or a lookup
/// object `{ "Id": .., "Name": .. }`.
fn lookup_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Object(lookup) => lookup.get("Id").and_then(lookup_id),
        _ => None,
    }
}

fn lookup_name(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(lookup) => lookup
            .get("Name")
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn date_only(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(text.chars().take(10).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_row, search_body, wire_record, Envelope, RemoteError};
    use crate::model::contact::{Contact, ContactDraft, ContactStatus};
    use crate::model::deal::{Deal, DealDraft};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn deal_row_normalizes_backend_naming() {
        let row = json!({
            "Id": 42,
            "Name": "Cloud Migration",
            "Owner": { "Id": 3, "Name": "Dana" },
            "CreatedOn": "2024-01-15T10:00:00Z",
            "ModifiedOn": null,
            "amount": 1500.0,
            "stage": "Lead",
            "close_date": "2024-03-01T00:00:00.000Z",
            "company_id": { "Id": 7, "Name": "TechCorp Solutions" },
            "contact_id": "5",
            "notes": null
        });

        let deal: Deal = serde_json::from_value(normalize_row(row)).unwrap();
        assert_eq!(deal.id, 42);
        assert_eq!(deal.name, "Cloud Migration");
        assert_eq!(deal.owner.as_deref(), Some("Dana"));
        assert_eq!(deal.company_id, Some(7));
        assert_eq!(deal.contact_id, Some(5));
        assert_eq!(deal.close_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(deal.created_at, 1_705_312_800_000);
        assert_eq!(deal.updated_at, 0);
        assert!(deal.notes.is_empty());
    }

    #[test]
    fn contact_write_row_carries_full_name_and_id() {
        let draft = ContactDraft {
            first_name: "Sarah".to_string(),
            last_name: "Johnson".to_string(),
            email: "sarah@techcorp.com".to_string(),
            status: ContactStatus::Active,
            ..ContactDraft::default()
        };
        let row = wire_record::<Contact>(&draft, Some(9)).unwrap();
        assert_eq!(row["Name"], json!("Sarah Johnson"));
        assert_eq!(row["Id"], json!(9));
        assert_eq!(row["status"], json!("Active"));
    }

    #[test]
    fn deal_owner_is_written_under_the_backend_column() {
        let draft = DealDraft {
            name: "Cloud Migration".to_string(),
            amount: 1500.0,
            owner: Some("sales@crm.example".to_string()),
            ..DealDraft::default()
        };
        let row = wire_record::<Deal>(&draft, Some(3)).unwrap();
        assert_eq!(row["Owner"], json!("sales@crm.example"));
        assert!(!row.contains_key("owner"));

        let deal: Deal = serde_json::from_value(normalize_row(row.into())).unwrap();
        assert_eq!(deal.owner.as_deref(), Some("sales@crm.example"));
        assert_eq!(deal.id, 3);
    }

    #[test]
    fn failed_write_reports_field_labels() {
        let envelope: Envelope = serde_json::from_value(json!({
            "success": true,
            "results": [{
                "success": false,
                "errors": [{ "fieldLabel": "Email", "message": "must be unique" }],
                "message": "record rejected"
            }]
        }))
        .unwrap();

        match envelope.first_success() {
            Err(RemoteError::RecordFailed { messages }) => {
                assert_eq!(messages, vec!["Email: must be unique", "record rejected"]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn rejected_envelope_surfaces_message() {
        let envelope: Envelope =
            serde_json::from_value(json!({ "success": false, "message": "bad key" })).unwrap();
        let err = envelope.into_data().unwrap_err();
        assert_eq!(err.to_string(), "remote backend rejected request: bad key");
    }

    #[test]
    fn contact_search_matches_any_search_column() {
        let body = search_body::<Contact>("sar");
        let groups = body["whereGroups"][0]["SubGroups"].as_array().unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[2]["conditions"][0]["FieldName"], json!("email"));
    }
}
