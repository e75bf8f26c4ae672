//! Contact record and lifecycle status.

use super::{EntityKind, Record, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Relationship status of a contact.
///
/// Serialized with the labels shown to users (`Lead`, `Active`, ...), which
/// are also the exact values matched by the contacts status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactStatus {
    #[default]
    Lead,
    Active,
    Prospect,
    Inactive,
}

impl ContactStatus {
    pub const ALL: [ContactStatus; 4] = [
        ContactStatus::Active,
        ContactStatus::Lead,
        ContactStatus::Prospect,
        ContactStatus::Inactive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::Active => "Active",
            Self::Prospect => "Prospect",
            Self::Inactive => "Inactive",
        }
    }
}

impl Display for ContactStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lead" => Ok(Self::Lead),
            "active" => Ok(Self::Active),
            "prospect" => Ok(Self::Prospect),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!(
                "unsupported contact status `{other}`; expected lead|active|prospect|inactive"
            )),
        }
    }
}

/// Person tracked by the CRM, optionally attached to a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: RecordId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub job_title: String,
    /// Soft reference to a `Company`.
    #[serde(default)]
    pub company_id: Option<RecordId>,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Editable contact fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company_id: Option<RecordId>,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub notes: String,
}

impl Record for Contact {
    type Draft = ContactDraft;

    const KIND: EntityKind = EntityKind::Contact;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: ContactDraft, now_ms: i64) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            job_title: draft.job_title,
            company_id: draft.company_id,
            status: draft.status,
            notes: draft.notes,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    fn apply_draft(&mut self, draft: ContactDraft, now_ms: i64) {
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.email = draft.email;
        self.phone = draft.phone;
        self.job_title = draft.job_title;
        self.company_id = draft.company_id;
        self.status = draft.status;
        self.notes = draft.notes;
        self.updated_at = now_ms;
    }

    fn to_draft(&self) -> ContactDraft {
        ContactDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            job_title: self.job_title.clone(),
            company_id: self.company_id,
            status: self.status,
            notes: self.notes.clone(),
        }
    }

    fn display_name(&self) -> String {
        self.full_name()
    }
}

#[cfg(test)]
mod tests {
    use super::ContactStatus;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("ACTIVE".parse::<ContactStatus>(), Ok(ContactStatus::Active));
        assert!("archived".parse::<ContactStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_value(ContactStatus::Prospect).unwrap();
        assert_eq!(json, "Prospect");
    }
}
