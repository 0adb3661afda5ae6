//! Service wiring: picks the grant store and shares the taxonomy.

use std::sync::Arc;

use anyhow::Context;

use bizconsole_auth::MenuTaxonomy;
use bizconsole_infra::{GrantService, GrantStore, InMemoryGrantStore, PostgresGrantStore};

use crate::config::ApiConfig;

pub type DynGrantStore = Arc<dyn GrantStore>;

pub struct AppServices {
    pub grants: GrantService<DynGrantStore>,
}

impl AppServices {
    /// In-memory wiring (dev/test).
    pub fn in_memory(taxonomy: Arc<MenuTaxonomy>) -> Self {
        let store: DynGrantStore = Arc::new(InMemoryGrantStore::new());
        Self {
            grants: GrantService::new(store, taxonomy),
        }
    }

    pub fn with_store(store: DynGrantStore, taxonomy: Arc<MenuTaxonomy>) -> Self {
        Self {
            grants: GrantService::new(store, taxonomy),
        }
    }

    /// Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub async fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let taxonomy = Arc::new(config.load_taxonomy()?);

        match &config.database_url {
            Some(url) => {
                let store = PostgresGrantStore::connect(url)
                    .await
                    .context("failed to open the Postgres grant store")?;
                tracing::info!("using Postgres grant store");
                Ok(Self::with_store(Arc::new(store), taxonomy))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; grants are kept in memory");
                Ok(Self::in_memory(taxonomy))
            }
        }
    }

    pub fn taxonomy(&self) -> &MenuTaxonomy {
        self.grants.taxonomy()
    }
}
