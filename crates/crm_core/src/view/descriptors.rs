//! Per-entity sortable columns and searchable field sets.

use super::fields::{FieldDescriptor, FieldKind, FieldValue, Listable};
use crate::model::company::Company;
use crate::model::contact::Contact;
use crate::model::deal::Deal;
use crate::model::stage::PipelineStage;

fn reference(id: Option<i64>) -> FieldValue<'static> {
    id.map_or(FieldValue::Missing, |id| FieldValue::Number(id as f64))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Name,
    Industry,
    Website,
    Phone,
    Address,
    Revenue,
    PrimaryContactId,
    Notes,
    CreatedAt,
    UpdatedAt,
}

impl FieldDescriptor for CompanyField {
    const ALL: &'static [Self] = &[
        Self::Name,
        Self::Industry,
        Self::Website,
        Self::Phone,
        Self::Address,
        Self::Revenue,
        Self::PrimaryContactId,
        Self::Notes,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    fn kind(self) -> FieldKind {
        match self {
            Self::Revenue | Self::PrimaryContactId => FieldKind::Numeric,
            Self::CreatedAt | Self::UpdatedAt => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Industry => "industry",
            Self::Website => "website",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::Revenue => "revenue",
            Self::PrimaryContactId => "primary_contact_id",
            Self::Notes => "notes",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl Listable for Company {
    type Field = CompanyField;

    const SEARCH_FIELDS: &'static [CompanyField] = &[CompanyField::Name, CompanyField::Industry];
    const DEFAULT_SORT: CompanyField = CompanyField::Name;

    fn field_value(&self, field: CompanyField) -> FieldValue<'_> {
        match field {
            CompanyField::Name => FieldValue::Text(&self.name),
            CompanyField::Industry => FieldValue::Text(&self.industry),
            CompanyField::Website => FieldValue::Text(&self.website),
            CompanyField::Phone => FieldValue::Text(&self.phone),
            CompanyField::Address => FieldValue::Text(&self.address),
            CompanyField::Revenue => FieldValue::Number(self.revenue),
            CompanyField::PrimaryContactId => reference(self.primary_contact_id),
            CompanyField::Notes => FieldValue::Text(&self.notes),
            CompanyField::CreatedAt => FieldValue::Date(self.created_at),
            CompanyField::UpdatedAt => FieldValue::Date(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    Phone,
    JobTitle,
    CompanyId,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl FieldDescriptor for ContactField {
    const ALL: &'static [Self] = &[
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::JobTitle,
        Self::CompanyId,
        Self::Status,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    fn kind(self) -> FieldKind {
        match self {
            Self::CompanyId => FieldKind::Numeric,
            Self::CreatedAt | Self::UpdatedAt => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::JobTitle => "job_title",
            Self::CompanyId => "company_id",
            Self::Status => "status",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl Listable for Contact {
    type Field = ContactField;

    const SEARCH_FIELDS: &'static [ContactField] = &[
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::Email,
        ContactField::JobTitle,
    ];
    const DEFAULT_SORT: ContactField = ContactField::FirstName;

    fn field_value(&self, field: ContactField) -> FieldValue<'_> {
        match field {
            ContactField::FirstName => FieldValue::Text(&self.first_name),
            ContactField::LastName => FieldValue::Text(&self.last_name),
            ContactField::Email => FieldValue::Text(&self.email),
            ContactField::Phone => FieldValue::Text(&self.phone),
            ContactField::JobTitle => FieldValue::Text(&self.job_title),
            ContactField::CompanyId => reference(self.company_id),
            ContactField::Status => FieldValue::Text(self.status.as_str()),
            ContactField::CreatedAt => FieldValue::Date(self.created_at),
            ContactField::UpdatedAt => FieldValue::Date(self.updated_at),
        }
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealField {
    Name,
    Amount,
    Stage,
    CloseDate,
    ContactId,
    CompanyId,
    Owner,
    CreatedAt,
    UpdatedAt,
}

impl FieldDescriptor for DealField {
    const ALL: &'static [Self] = &[
        Self::Name,
        Self::Amount,
        Self::Stage,
        Self::CloseDate,
        Self::ContactId,
        Self::CompanyId,
        Self::Owner,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    fn kind(self) -> FieldKind {
        match self {
            Self::Amount | Self::ContactId | Self::CompanyId => FieldKind::Numeric,
            Self::CloseDate | Self::CreatedAt | Self::UpdatedAt => FieldKind::Date,
            Self::Name | Self::Stage | Self::Owner => FieldKind::Text,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Amount => "amount",
            Self::Stage => "stage",
            Self::CloseDate => "close_date",
            Self::ContactId => "contact_id",
            Self::CompanyId => "company_id",
            Self::Owner => "owner",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl Listable for Deal {
    type Field = DealField;

    const SEARCH_FIELDS: &'static [DealField] = &[DealField::Name, DealField::Stage];
    const DEFAULT_SORT: DealField = DealField::Name;

    fn field_value(&self, field: DealField) -> FieldValue<'_> {
        match field {
            DealField::Name => FieldValue::Text(&self.name),
            DealField::Amount => FieldValue::Number(self.amount),
            DealField::Stage => FieldValue::Text(&self.stage),
            DealField::CloseDate => self.close_date.map_or(FieldValue::Missing, FieldValue::Day),
            DealField::ContactId => reference(self.contact_id),
            DealField::CompanyId => reference(self.company_id),
            DealField::Owner => self
                .owner
                .as_deref()
                .map_or(FieldValue::Missing, FieldValue::Text),
            DealField::CreatedAt => FieldValue::Date(self.created_at),
            DealField::UpdatedAt => FieldValue::Date(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageField {
    Name,
    Color,
    Position,
}

impl FieldDescriptor for StageField {
    const ALL: &'static [Self] = &[Self::Name, Self::Color, Self::Position];

    fn kind(self) -> FieldKind {
        match self {
            Self::Position => FieldKind::Numeric,
            Self::Name | Self::Color => FieldKind::Text,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Color => "color",
            Self::Position => "position",
        }
    }
}

impl Listable for PipelineStage {
    type Field = StageField;

    const SEARCH_FIELDS: &'static [StageField] = &[StageField::Name];
    const DEFAULT_SORT: StageField = StageField::Position;

    fn field_value(&self, field: StageField) -> FieldValue<'_> {
        match field {
            StageField::Name => FieldValue::Text(&self.name),
            StageField::Color => FieldValue::Text(&self.color),
            StageField::Position => FieldValue::Number(f64::from(self.position)),
        }
    }
}
