//! A [`PoolDataProvider`] listing pools from a Balancer V2 subgraph.

use {
    crate::{
        domain::pool::{self, PoolId, source::PoolDataProvider},
        util,
    },
    itertools::Itertools,
    std::{
        sync::{atomic, atomic::AtomicU64},
        time::Duration,
    },
    tracing::Instrument,
};

pub mod dto;

/// The largest `first` argument the hosted subgraphs accept. Bigger pages
/// are truncated, which would end the listing after the first page.
pub const MAX_PAGE_SIZE: usize = 1000;

pub struct Config {
    /// The GraphQL endpoint of the subgraph.
    pub url: reqwest::Url,
    /// Restricts the listing to these pools. Empty means all pools of a
    /// supported type.
    pub pool_ids: Vec<PoolId>,
    /// How many pools to request per page, at most [`MAX_PAGE_SIZE`].
    pub page_size: usize,
    pub timeout: Duration,
}

pub struct Subgraph {
    client: reqwest::Client,
    url: reqwest::Url,
    pool_ids: Option<Vec<String>>,
    page_size: usize,
}

impl Subgraph {
    pub fn new(config: Config) -> Result<Self, Error> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .map_err(util::http::Error::from)?,
            url: config.url,
            pool_ids: (!config.pool_ids.is_empty())
                .then(|| config.pool_ids.iter().map(ToString::to_string).collect()),
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    /// Fetches all pages of the pool listing.
    pub async fn pools(&self) -> Result<Vec<dto::Pool>, Error> {
        let mut pools = Vec::new();
        loop {
            let page = self.page(pools.len()).await?;
            let no_more_pages = page.len() != self.page_size;
            pools.extend(page);
            if no_more_pages {
                break;
            }
        }
        Ok(pools)
    }

    async fn page(&self, skip: usize) -> Result<Vec<dto::Pool>, Error> {
        let query = dto::Query::page(self.page_size, skip, self.pool_ids.as_deref());
        let response: dto::Response = util::http::roundtrip(
            self.client
                .request(reqwest::Method::POST, self.url.clone())
                .json(&query),
        )
        .await?;

        if !response.errors.is_empty() {
            return Err(Error::GraphQl(
                response.errors.iter().map(|err| &err.message).join("; "),
            ));
        }
        let data = response.data.ok_or(Error::MissingData)?;
        tracing::trace!(skip, pools = data.pools.len(), "received pool page");
        Ok(data.pools)
    }
}

#[async_trait::async_trait]
impl PoolDataProvider for Subgraph {
    async fn fetch_pools(&self) -> anyhow::Result<Vec<pool::Pool>> {
        let pools = {
            // Each listing gets its own span so that the pages of one fetch
            // can be told apart in the logs.
            static ID: AtomicU64 = AtomicU64::new(0);
            let id = ID.fetch_add(1, atomic::Ordering::Relaxed);
            self.pools()
                .instrument(tracing::trace_span!("subgraph", id = %id))
                .await?
        };

        Ok(pools
            .iter()
            .map(dto::Pool::to_domain)
            .collect::<Result<_, _>>()?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] util::http::Error),
    #[error("subgraph query failed: {0}")]
    GraphQl(String),
    #[error("subgraph response has no data")]
    MissingData,
    #[error("pool {id}: {reason}")]
    InvalidPool { id: PoolId, reason: String },
    #[error("pool {0} has unsupported type {1}")]
    UnsupportedPoolType(PoolId, String),
}
