//! The pool state source: fetches pools from a [`PoolDataProvider`] and keeps
//! the resulting dictionary until a refresh is requested.
//!
//! The cache has a single writer. [`PoolStateSource::pools_dictionary`] takes
//! `&mut self`, so concurrent simulations either go through one owner in turn
//! or use independent sources.

use {
    super::{InvalidPool, Pool, PoolId, Pools},
    crate::infra::metrics,
    std::sync::Arc,
};

/// The external capability listing all pools a simulation may touch.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PoolDataProvider: Send + Sync {
    async fn fetch_pools(&self) -> anyhow::Result<Vec<Pool>>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("pool data provider failed: {0:#}")]
    Provider(anyhow::Error),
    #[error(transparent)]
    InvalidPool(#[from] InvalidPool),
    #[error("pool {0} listed more than once")]
    DuplicatePool(PoolId),
}

pub struct PoolStateSource {
    provider: Box<dyn PoolDataProvider>,
    cache: Option<Arc<Pools>>,
}

impl PoolStateSource {
    pub fn new(provider: Box<dyn PoolDataProvider>) -> Self {
        Self {
            provider,
            cache: None,
        }
    }

    /// Returns the cached pool dictionary, fetching a new one if there is no
    /// cache yet or `refresh` is set. A failed fetch leaves the previous cache
    /// in place.
    pub async fn pools_dictionary(&mut self, refresh: bool) -> Result<Arc<Pools>, DataSourceError> {
        if let Some(pools) = self.cache.as_ref().filter(|_| !refresh) {
            tracing::debug!(pools = pools.len(), "using cached pools");
            return Ok(pools.clone());
        }

        let fetched = self.provider.fetch_pools().await;
        metrics::pool_fetch(fetched.is_ok());
        let fetched = fetched.map_err(DataSourceError::Provider)?;
        let pools = Arc::new(build(fetched)?);
        tracing::info!(pools = pools.len(), refresh, "fetched pools");
        self.cache = Some(pools.clone());
        Ok(pools)
    }

    /// Whether a dictionary has been fetched successfully.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }
}

fn build(fetched: Vec<Pool>) -> Result<Pools, DataSourceError> {
    let mut pools = Pools::with_capacity(fetched.len());
    for pool in fetched {
        pool.validate()?;
        let id = pool.id;
        if pools.insert(id, pool).is_some() {
            return Err(DataSourceError::DuplicatePool(id));
        }
    }
    Ok(pools)
}
