//! Cross-entity search entry points.
//!
//! # Responsibility
//! - Fan one query out to the contact, company and deal stores.
//! - Shape results into typed hits tagged with their entity kind.

pub mod global;

pub use global::{search_all, SearchHit, SearchQuery};
