//! Dashboard page state.

use super::LoadState;
use crate::dashboard::{load_metrics, DashboardMetrics};
use crate::notify::{Notice, Notifier};
use crate::store::StoreSet;
use log::error;
use std::sync::Arc;

pub struct DashboardPage {
    stores: StoreSet,
    notifier: Arc<dyn Notifier>,
    state: LoadState,
    metrics: Option<DashboardMetrics>,
}

impl DashboardPage {
    pub fn new(stores: StoreSet, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            stores,
            notifier,
            state: LoadState::Idle,
            metrics: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn metrics(&self) -> Option<&DashboardMetrics> {
        self.metrics.as_ref()
    }

    /// Loads (or retries) the dashboard aggregates.
    pub async fn load(&mut self) -> bool {
        self.state = LoadState::Loading;
        match load_metrics(&self.stores).await {
            Ok(metrics) => {
                self.metrics = Some(metrics);
                self.state = LoadState::Ready;
                true
            }
            Err(err) => {
                error!("event=dashboard_load module=page status=error error={err}");
                self.notifier
                    .notify(Notice::error("Failed to load dashboard data"));
                self.state = LoadState::Failed(err.to_string());
                false
            }
        }
    }
}
