//! List query state and its update rules.

use super::fields::FieldDescriptor;
use crate::model::contact::ContactStatus;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Rows per list page.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Status restriction of a list; only kinds with a status are affected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(String),
}

impl FromStr for StatusFilter {
    type Err = Infallible;

    /// `"all"` (any case) or an empty string selects every status.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Only(value.to_string()))
        }
    }
}

impl StatusFilter {
    /// Parses user input against the known contact statuses.
    ///
    /// Any casing of a status name maps to its canonical label, which is what
    /// the exact-match filter compares against.
    pub fn for_contacts(input: &str) -> Result<Self, String> {
        if matches!(input.parse::<Self>(), Ok(Self::All)) {
            return Ok(Self::All);
        }
        let status = input.parse::<ContactStatus>()?;
        Ok(Self::Only(status.as_str().to_string()))
    }
}

impl Display for StatusFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => f.write_str(status),
        }
    }
}

/// Search, filter, sort and page selection of one list.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<F> {
    pub search_text: String,
    pub status_filter: StatusFilter,
    pub sort_field: F,
    pub sort_direction: SortDirection,
    /// 1-based; not clamped against the result size.
    pub page: usize,
    pub page_size: usize,
}

impl<F: FieldDescriptor> QueryState<F> {
    pub fn new(sort_field: F) -> Self {
        Self {
            search_text: String::new(),
            status_filter: StatusFilter::All,
            sort_field,
            sort_direction: SortDirection::Asc,
            page: 1,
            page_size: PAGE_SIZE,
        }
    }

    /// Toggling the active field flips direction; a new field sorts ascending.
    pub fn toggle_sort(&mut self, field: F) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.flip();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Asc;
        }
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.page = 1;
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
        self.page = 1;
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{QueryState, SortDirection, StatusFilter};
    use crate::view::descriptors::DealField;

    #[test]
    fn toggle_flips_active_field_and_resets_new_field() {
        let mut query = QueryState::new(DealField::Amount);
        query.toggle_sort(DealField::Amount);
        assert_eq!(query.sort_direction, SortDirection::Desc);

        query.toggle_sort(DealField::Name);
        assert_eq!(query.sort_field, DealField::Name);
        assert_eq!(query.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn filter_changes_reset_page() {
        let mut query = QueryState::new(DealField::Name);
        query.go_to_page(3);
        query.set_search_text("cloud");
        assert_eq!(query.page, 1);

        query.go_to_page(2);
        query.set_status_filter("Active".parse().unwrap());
        assert_eq!(query.page, 1);
        assert_eq!(query.status_filter, StatusFilter::Only("Active".to_string()));
    }

    #[test]
    fn contact_filter_input_maps_to_canonical_status() {
        assert_eq!(
            StatusFilter::for_contacts("active").unwrap(),
            StatusFilter::Only("Active".to_string())
        );
        assert_eq!(
            StatusFilter::for_contacts(" INACTIVE ").unwrap(),
            StatusFilter::Only("Inactive".to_string())
        );
        assert_eq!(StatusFilter::for_contacts("All").unwrap(), StatusFilter::All);
        assert!(StatusFilter::for_contacts("archived").is_err());
    }

    #[test]
    fn all_parses_case_insensitively() {
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
    }
}
