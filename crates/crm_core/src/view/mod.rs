//! List View Engine.
//!
//! # Responsibility
//! - Turn a record collection plus a query state into one rendered page.
//! - Describe per-entity sortable fields and searchable field sets.
//!
//! # Invariants
//! - The rendered page is a deterministic function of (collection, query).
//! - The engine never mutates its input.
//! - `page_items.len() <= page_size` and `total_pages >= 1`.

pub mod descriptors;
pub mod engine;
pub mod fields;
pub mod query;

pub use descriptors::{CompanyField, ContactField, DealField, StageField};
pub use engine::{compute_view, ListView};
pub use fields::{FieldDescriptor, FieldKind, FieldValue, Listable, SortKey};
pub use query::{QueryState, SortDirection, StatusFilter, PAGE_SIZE};
