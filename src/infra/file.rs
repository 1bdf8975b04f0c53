//! A [`PoolDataProvider`] reading pools from a JSON file. The file uses the
//! same shape as the subgraph's `data` object, so a saved subgraph response
//! can be replayed offline.

use {
    crate::{
        domain::pool::{self, source::PoolDataProvider},
        infra::subgraph::dto,
    },
    anyhow::Context,
    std::path::PathBuf,
};

pub struct PoolsFile {
    path: PathBuf,
}

impl PoolsFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait::async_trait]
impl PoolDataProvider for PoolsFile {
    /// Re-reads the file on every fetch.
    async fn fetch_pools(&self) -> anyhow::Result<Vec<pool::Pool>> {
        let data = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("I/O error while reading {:?}", self.path))?;
        let data: dto::Data = serde_json::from_str(&data)
            .with_context(|| format!("invalid pools file {:?}", self.path))?;
        tracing::debug!(path = ?self.path, pools = data.pools.len(), "read pools file");
        Ok(data
            .pools
            .iter()
            .map(dto::Pool::to_domain)
            .collect::<Result<_, _>>()?)
    }
}
