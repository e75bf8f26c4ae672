//! Field descriptors and sort-key coercion.

use crate::model::Record;
use chrono::{DateTime, NaiveDate};
use std::cmp::Ordering;
use std::fmt::Debug;

/// Comparison family of a sortable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Date,
    Text,
}

/// Raw value read from a record before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Missing,
    Text(&'a str),
    Number(f64),
    /// Unix epoch milliseconds.
    Date(i64),
    Day(NaiveDate),
}

impl FieldValue<'_> {
    /// Text used by free-text search; `None` when the field is empty.
    pub fn search_text(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Text(text) => Some(text.to_lowercase()),
            Self::Number(number) => Some(number.to_string()),
            Self::Date(ms) => Some(ms.to_string()),
            Self::Day(day) => Some(day.to_string()),
        }
    }
}

/// Comparable key derived from a `FieldValue` for one `FieldKind`.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Millis(i64),
    Text(String),
}

impl SortKey {
    /// Coerces `value` into the comparison family of `kind`.
    ///
    /// Missing or malformed numbers become `0`, dates the Unix epoch and
    /// text the empty string.
    pub fn coerce(kind: FieldKind, value: &FieldValue<'_>) -> Self {
        match kind {
            FieldKind::Numeric => Self::Number(match value {
                FieldValue::Number(number) if number.is_finite() => *number,
                FieldValue::Text(text) => text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .unwrap_or(0.0),
                FieldValue::Date(ms) => *ms as f64,
                _ => 0.0,
            }),
            FieldKind::Date => Self::Millis(match value {
                FieldValue::Date(ms) => *ms,
                FieldValue::Day(day) => day_millis(*day),
                FieldValue::Text(text) => parse_millis(text).unwrap_or(0),
                FieldValue::Number(number) if number.is_finite() => *number as i64,
                _ => 0,
            }),
            FieldKind::Text => Self::Text(match value {
                FieldValue::Missing => String::new(),
                other => other.search_text().unwrap_or_default(),
            }),
        }
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Millis(left), Self::Millis(right)) => left.cmp(right),
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            // Keys of one column always share a variant.
            _ => Ordering::Equal,
        }
    }
}

/// Sortable column of one entity kind.
pub trait FieldDescriptor: Copy + Eq + Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    fn kind(self) -> FieldKind;

    /// Canonical snake_case name.
    fn key(self) -> &'static str;

    /// Resolves a field name in snake_case or camelCase, ignoring case.
    fn from_key(key: &str) -> Option<Self> {
        let wanted = fold_key(key);
        Self::ALL
            .iter()
            .copied()
            .find(|field| fold_key(field.key()) == wanted)
    }
}

/// Record kinds that can be rendered by the list view engine.
pub trait Listable: Record {
    type Field: FieldDescriptor;

    /// Fields matched by the free-text search.
    const SEARCH_FIELDS: &'static [Self::Field];
    /// Initial sort column of a fresh list page.
    const DEFAULT_SORT: Self::Field;

    fn field_value(&self, field: Self::Field) -> FieldValue<'_>;

    /// Status label matched by the status filter, for kinds that carry one.
    fn status(&self) -> Option<&str> {
        None
    }

    fn sort_key(&self, field: Self::Field) -> SortKey {
        SortKey::coerce(field.kind(), &self.field_value(field))
    }

    /// Case-insensitive substring match over `SEARCH_FIELDS`.
    ///
    /// `needle` must already be lowercase; an empty needle matches.
    fn matches_text(&self, needle: &str) -> bool {
        needle.is_empty()
            || Self::SEARCH_FIELDS.iter().any(|field| {
                self.field_value(*field)
                    .search_text()
                    .is_some_and(|text| text.contains(needle))
            })
    }
}

fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|ch| *ch != '_' && *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn day_millis(day: NaiveDate) -> i64 {
    day.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .unwrap_or(0)
}

fn parse_millis(text: &str) -> Option<i64> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|parsed| parsed.timestamp_millis())
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(day_millis)
        })
}
