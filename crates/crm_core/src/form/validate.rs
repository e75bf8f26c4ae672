//! Client-side draft validation.
//!
//! # Invariants
//! - Validation is pure and runs before any store call.
//! - Error keys are the snake_case draft field names.

use crate::model::company::CompanyDraft;
use crate::model::contact::ContactDraft;
use crate::model::deal::DealDraft;
use crate::model::stage::PipelineStageDraft;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email regex"));
static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid color regex"));

/// Per-field validation messages for one draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn clear(&mut self, field: &str) {
        self.fields.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Flagged field names in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.fields
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Draft-level validation contract.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl Validate for CompanyDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "name", &self.name, "Company name is required");
        require(&mut errors, "industry", &self.industry, "Industry is required");
        if !self.revenue.is_finite() || self.revenue < 0.0 {
            errors.add("revenue", "Revenue cannot be negative");
        }
        errors.into_result()
    }
}

impl Validate for ContactDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "first_name", &self.first_name, "First name is required");
        require(&mut errors, "last_name", &self.last_name, "Last name is required");
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Email is invalid");
        }
        errors.into_result()
    }
}

impl Validate for DealDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "name", &self.name, "Deal name is required");
        if !(self.amount.is_finite() && self.amount > 0.0) {
            errors.add("amount", "Amount must be greater than 0");
        }
        require(&mut errors, "stage", &self.stage, "Stage is required");
        if self.close_date.is_none() {
            errors.add("close_date", "Close date is required");
        }
        errors.into_result()
    }
}

impl Validate for PipelineStageDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "name", &self.name, "Stage name is required");
        if !self.color.is_empty() && !HEX_COLOR_RE.is_match(&self.color) {
            errors.add("color", "Color must be a hex value like #3b82f6");
        }
        errors.into_result()
    }
}

/// Returns whether `value` has the basic `local@domain.tld` shape.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

fn require(errors: &mut ValidationErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, Validate};
    use crate::model::company::CompanyDraft;
    use crate::model::stage::PipelineStageDraft;

    #[test]
    fn email_shape_requires_at_and_dot() {
        assert!(is_valid_email("ana@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana example.com"));
    }

    #[test]
    fn company_rejects_negative_revenue() {
        let draft = CompanyDraft {
            name: "Acme".to_string(),
            industry: "Manufacturing".to_string(),
            revenue: -1.0,
            ..CompanyDraft::default()
        };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["revenue"]);
    }

    #[test]
    fn stage_color_is_optional_but_checked() {
        let mut draft = PipelineStageDraft {
            name: "Lead".to_string(),
            ..PipelineStageDraft::default()
        };
        assert!(draft.validate().is_ok());
        draft.color = "blue".to_string();
        assert!(draft.validate().unwrap_err().contains("color"));
    }
}
