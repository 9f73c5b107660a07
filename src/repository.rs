use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use tracing::{info, warn};

use crate::client::CatalogSource;
use crate::error::{Result, StoreError};
use crate::models::{Rocket, RocketEntity};
use crate::store::RocketStore;

pub type RocketListStream = BoxStream<'static, Result<Vec<Rocket>, StoreError>>;
pub type RocketStream = BoxStream<'static, Result<Option<Rocket>, StoreError>>;

/// Keeps the local store in step with the remote catalog and exposes the
/// store in domain shape. Presentation never reads the remote side directly.
pub struct RocketRepository {
    api: Arc<dyn CatalogSource>,
    store: RocketStore,
}

impl RocketRepository {
    pub fn new(api: Arc<dyn CatalogSource>, store: RocketStore) -> Self {
        Self { api, store }
    }

    pub fn observe_rockets(&self) -> RocketListStream {
        self.store
            .observe_all()
            .map(|snapshot| {
                snapshot.map(|rows| rows.into_iter().map(Rocket::from).collect::<Vec<_>>())
            })
            .boxed()
    }

    pub fn observe_rocket(&self, id: &str) -> RocketStream {
        self.store
            .observe_one(id)
            .map(|row| row.map(|row| row.map(Rocket::from)))
            .boxed()
    }

    /// Pull the remote catalog and upsert it locally.
    ///
    /// A failed fetch leaves the store untouched. Rockets that disappeared
    /// from the remote catalog stay in the store.
    pub async fn refresh(&self) -> Result<()> {
        let remote = self.api.fetch_all().await.map_err(|e| {
            warn!(error = %e, "rocket catalog fetch failed");
            e
        })?;
        let entities: Vec<RocketEntity> = remote.into_iter().map(RocketEntity::from).collect();
        let count = entities.len();
        self.store.upsert_all(entities).await?;
        info!(count, "rocket catalog refreshed");
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await?;
        Ok(())
    }
}
