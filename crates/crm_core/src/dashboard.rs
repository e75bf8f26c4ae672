//! Dashboard aggregates over the four collections.

use crate::kanban::ordered_stages;
use crate::model::company::Company;
use crate::model::contact::{Contact, ContactStatus};
use crate::model::deal::{Deal, STAGE_CLOSED_WON};
use crate::model::stage::PipelineStage;
use crate::store::{StoreResult, StoreSet};
use log::info;
use std::time::Instant;

/// Deals filed under one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageDistribution {
    pub stage: String,
    pub color: String,
    pub count: usize,
    pub value: f64,
    /// Zero for an empty stage.
    pub average_deal_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    pub total_pipeline_value: f64,
    pub open_deals: usize,
    pub won_deals: usize,
    pub won_value: f64,
    pub active_contacts: usize,
    pub companies: usize,
    /// In column order.
    pub stages: Vec<StageDistribution>,
}

pub fn compute_metrics(
    deals: &[Deal],
    contacts: &[Contact],
    companies: &[Company],
    stages: &[PipelineStage],
) -> DashboardMetrics {
    let won: Vec<&Deal> = deals
        .iter()
        .filter(|deal| deal.stage == STAGE_CLOSED_WON)
        .collect();

    DashboardMetrics {
        total_pipeline_value: deals.iter().map(|deal| deal.amount).sum(),
        open_deals: deals.iter().filter(|deal| !deal.is_closed()).count(),
        won_deals: won.len(),
        won_value: won.iter().map(|deal| deal.amount).sum(),
        active_contacts: contacts
            .iter()
            .filter(|contact| contact.status == ContactStatus::Active)
            .count(),
        companies: companies.len(),
        stages: ordered_stages(stages)
            .into_iter()
            .map(|stage| {
                let (count, value) = deals
                    .iter()
                    .filter(|deal| deal.stage == stage.name)
                    .fold((0usize, 0.0f64), |(count, value), deal| {
                        (count + 1, value + deal.amount)
                    });
                StageDistribution {
                    stage: stage.name.clone(),
                    color: stage.color.clone(),
                    count,
                    value,
                    average_deal_size: if count == 0 { 0.0 } else { value / count as f64 },
                }
            })
            .collect(),
    }
}

/// Loads all four collections concurrently and aggregates them.
///
/// Any failing load fails the whole dashboard.
pub async fn load_metrics(stores: &StoreSet) -> StoreResult<DashboardMetrics> {
    let started_at = Instant::now();
    let (deals, contacts, companies, stages) = tokio::try_join!(
        stores.deals.get_all(),
        stores.contacts.get_all(),
        stores.companies.get_all(),
        stores.stages.get_all(),
    )?;
    info!(
        "event=dashboard_load module=dashboard status=ok duration_ms={} deals={} contacts={}",
        started_at.elapsed().as_millis(),
        deals.len(),
        contacts.len()
    );
    Ok(compute_metrics(&deals, &contacts, &companies, &stages))
}

#[cfg(test)]
mod tests {
    use super::compute_metrics;
    use crate::model::company::Company;
    use crate::model::contact::Contact;
    use crate::model::deal::Deal;
    use crate::model::stage::PipelineStage;
    use crate::store::fixtures::Seed;

    #[test]
    fn fixture_metrics_add_up() {
        let deals = Deal::fixtures().unwrap();
        let metrics = compute_metrics(
            &deals,
            &Contact::fixtures().unwrap(),
            &Company::fixtures().unwrap(),
            &PipelineStage::fixtures().unwrap(),
        );

        let total: f64 = deals.iter().map(|deal| deal.amount).sum();
        assert_eq!(metrics.total_pipeline_value, total);
        assert_eq!(metrics.companies, 8);
        assert_eq!(metrics.stages.len(), 6);
        assert_eq!(metrics.stages[0].stage, "Lead");
        assert_eq!(
            metrics.stages.iter().map(|stage| stage.count).sum::<usize>(),
            deals.len()
        );
        for stage in &metrics.stages {
            if stage.count > 0 {
                assert_eq!(stage.average_deal_size, stage.value / stage.count as f64);
            }
        }
    }

    #[test]
    fn empty_stage_has_zero_average() {
        let stages = vec![PipelineStage {
            id: 1,
            name: "Lead".to_string(),
            color: String::new(),
            position: 0,
        }];
        let metrics = compute_metrics(&[], &[], &[], &stages);
        assert_eq!(metrics.stages[0].average_deal_size, 0.0);
        assert_eq!(metrics.open_deals, 0);
    }
}
