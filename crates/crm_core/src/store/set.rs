//! One store per entity kind, built for a selected backend.

use super::fixtures::Seed;
use super::sqlite::SqlRecord;
use super::{
    DealStageStore, MemoryStore, RecordStore, RemoteSettings, RemoteStore, SearchStore,
    SharedConnection, SqliteStore, StoreError, StoreResult,
};
use crate::config::{Backend, ConfigError, CrmConfig};
use crate::db::open_shared;
use crate::model::company::Company;
use crate::model::contact::Contact;
use crate::model::deal::Deal;
use crate::model::stage::PipelineStage;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Failure to assemble a `StoreSet` from configuration.
#[derive(Debug)]
pub enum SetupError {
    Config(ConfigError),
    Store(StoreError),
}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SetupError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StoreError> for SetupError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Record Stores for all four entity kinds, sharing one backend.
#[derive(Clone)]
pub struct StoreSet {
    pub companies: Arc<dyn SearchStore<Company>>,
    pub contacts: Arc<dyn SearchStore<Contact>>,
    pub deals: Arc<dyn DealStageStore>,
    pub stages: Arc<dyn RecordStore<PipelineStage>>,
}

impl StoreSet {
    /// In-memory stores, optionally seeded from the embedded fixtures.
    pub fn in_memory(seed: bool, latency: Duration) -> StoreResult<Self> {
        fn build<R: Seed>(seed: bool, latency: Duration) -> StoreResult<MemoryStore<R>> {
            let store = if seed {
                MemoryStore::from_fixtures()?
            } else {
                MemoryStore::new()
            };
            Ok(store.with_latency(latency))
        }

        Ok(Self {
            companies: Arc::new(build::<Company>(seed, latency)?),
            contacts: Arc::new(build::<Contact>(seed, latency)?),
            deals: Arc::new(build::<Deal>(seed, latency)?),
            stages: Arc::new(build::<PipelineStage>(seed, latency)?),
        })
    }

    /// SQLite stores over one migrated connection.
    ///
    /// With `seed`, empty tables are filled from the embedded fixtures.
    pub fn sqlite(conn: SharedConnection, seed: bool) -> StoreResult<Self> {
        fn build<R: Seed + SqlRecord>(
            conn: &SharedConnection,
            seed: bool,
        ) -> StoreResult<SqliteStore<R>> {
            let store = SqliteStore::try_new(Arc::clone(conn))?;
            if seed {
                let imported = store.seed_if_empty(&R::fixtures()?)?;
                if imported > 0 {
                    info!(
                        "event=store_seed module=store status=ok backend=sqlite kind={} count={imported}",
                        R::KIND.as_str()
                    );
                }
            }
            Ok(store)
        }

        Ok(Self {
            companies: Arc::new(build::<Company>(&conn, seed)?),
            contacts: Arc::new(build::<Contact>(&conn, seed)?),
            deals: Arc::new(build::<Deal>(&conn, seed)?),
            stages: Arc::new(build::<PipelineStage>(&conn, seed)?),
        })
    }

    /// Remote stores sharing one HTTP client.
    pub fn remote(settings: RemoteSettings) -> Self {
        let client = reqwest::Client::new();
        let settings = Arc::new(settings);
        Self {
            companies: Arc::new(RemoteStore::<Company>::new(client.clone(), Arc::clone(&settings))),
            contacts: Arc::new(RemoteStore::<Contact>::new(client.clone(), Arc::clone(&settings))),
            deals: Arc::new(RemoteStore::<Deal>::new(client.clone(), Arc::clone(&settings))),
            stages: Arc::new(RemoteStore::<PipelineStage>::new(client, settings)),
        }
    }

    pub fn from_config(config: &CrmConfig) -> Result<Self, SetupError> {
        let set = match config.store.backend {
            Backend::Memory => Self::in_memory(
                config.store.seed,
                Duration::from_millis(config.store.latency_ms),
            )?,
            Backend::Sqlite => {
                let conn = open_shared(&config.store.sqlite_path).map_err(StoreError::from)?;
                Self::sqlite(conn, config.store.seed)?
            }
            Backend::Remote => Self::remote(config.remote_settings()?),
        };
        info!(
            "event=store_setup module=store status=ok backend={}",
            set.backend_tag()
        );
        Ok(set)
    }

    pub fn backend_tag(&self) -> &'static str {
        self.deals.backend_tag()
    }
}

#[cfg(test)]
mod tests {
    use super::StoreSet;
    use std::time::Duration;

    #[tokio::test]
    async fn seeded_memory_set_serves_fixtures() {
        let set = StoreSet::in_memory(true, Duration::ZERO).unwrap();
        assert_eq!(set.backend_tag(), "memory");
        assert_eq!(set.deals.get_all().await.unwrap().len(), 12);
        assert_eq!(set.stages.get_all().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn unseeded_memory_set_starts_empty() {
        let set = StoreSet::in_memory(false, Duration::ZERO).unwrap();
        assert!(set.companies.get_all().await.unwrap().is_empty());
    }
}
