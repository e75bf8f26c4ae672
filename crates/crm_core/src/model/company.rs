//! Company record.

use super::{EntityKind, Record, RecordId};
use serde::{Deserialize, Serialize};

/// Organization tracked by the CRM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Annual revenue; never negative for records accepted by a store.
    #[serde(default)]
    pub revenue: f64,
    /// Soft reference to a `Contact`.
    #[serde(default)]
    pub primary_contact_id: Option<RecordId>,
    #[serde(default)]
    pub notes: String,
    /// Unix epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Unix epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
}

/// Editable company fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyDraft {
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub primary_contact_id: Option<RecordId>,
    #[serde(default)]
    pub notes: String,
}

impl Record for Company {
    type Draft = CompanyDraft;

    const KIND: EntityKind = EntityKind::Company;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: CompanyDraft, now_ms: i64) -> Self {
        Self {
            id,
            name: draft.name,
            industry: draft.industry,
            website: draft.website,
            phone: draft.phone,
            address: draft.address,
            revenue: draft.revenue,
            primary_contact_id: draft.primary_contact_id,
            notes: draft.notes,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    fn apply_draft(&mut self, draft: CompanyDraft, now_ms: i64) {
        self.name = draft.name;
        self.industry = draft.industry;
        self.website = draft.website;
        self.phone = draft.phone;
        self.address = draft.address;
        self.revenue = draft.revenue;
        self.primary_contact_id = draft.primary_contact_id;
        self.notes = draft.notes;
        self.updated_at = now_ms;
    }

    fn to_draft(&self) -> CompanyDraft {
        CompanyDraft {
            name: self.name.clone(),
            industry: self.industry.clone(),
            website: self.website.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            revenue: self.revenue,
            primary_contact_id: self.primary_contact_id,
            notes: self.notes.clone(),
        }
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}
