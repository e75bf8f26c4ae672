//! Static seed data embedded in the crate.
//!
//! Fixtures use the canonical record layout, so they decode with the
//! records' own serde derives and no boundary normalization.

use super::{StoreError, StoreResult};
use crate::model::company::Company;
use crate::model::contact::Contact;
use crate::model::deal::Deal;
use crate::model::stage::PipelineStage;
use crate::model::Record;

/// Records that ship with a JSON seed collection.
pub trait Seed: Record {
    const FIXTURE_JSON: &'static str;

    fn fixtures() -> StoreResult<Vec<Self>> {
        serde_json::from_str(Self::FIXTURE_JSON).map_err(|err| {
            StoreError::InvalidData(format!(
                "invalid {} fixture: {err}",
                Self::KIND.as_str()
            ))
        })
    }
}

impl Seed for Company {
    const FIXTURE_JSON: &'static str = include_str!("../../fixtures/companies.json");
}

impl Seed for Contact {
    const FIXTURE_JSON: &'static str = include_str!("../../fixtures/contacts.json");
}

impl Seed for Deal {
    const FIXTURE_JSON: &'static str = include_str!("../../fixtures/deals.json");
}

impl Seed for PipelineStage {
    const FIXTURE_JSON: &'static str = include_str!("../../fixtures/pipeline_stages.json");
}
