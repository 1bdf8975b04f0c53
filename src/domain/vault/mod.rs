//! The vault model: replays an ordered batch of joins, exits and swaps
//! against locally held pool state and reports the net token deltas, without
//! sending a transaction.
//!
//! Pool state is fetched once per multicall and stays immutable while the
//! batch runs. Steps do not see each other's effect on pool balances; only
//! the deltas and the output references chain steps together.

use {
    crate::{
        domain::{
            eth::{Address, U256},
            pool::{
                PoolId,
                math::{self, Registry},
                source::{DataSourceError, PoolDataProvider, PoolStateSource},
            },
        },
        infra::metrics,
    },
    executor::Executor,
};

pub mod deltas;
pub mod executor;
pub mod relayer;
pub mod request;
pub mod user_data;

pub use {
    deltas::Deltas,
    relayer::{Amount, OutputReference},
    request::{ActionType, Request},
};

pub struct VaultModel {
    source: PoolStateSource,
    math: Registry,
}

impl VaultModel {
    /// A vault model with the weighted and stable pool math.
    pub fn new(provider: Box<dyn PoolDataProvider>) -> Self {
        Self::with_math(provider, Registry::default())
    }

    pub fn with_math(provider: Box<dyn PoolDataProvider>, math: Registry) -> Self {
        Self {
            source: PoolStateSource::new(provider),
            math,
        }
    }

    /// Simulates `requests` in order and returns the accumulated deltas.
    ///
    /// Pools are fetched on the first call and whenever `refresh` is set.
    /// Output references only live for the duration of one call. Any failing
    /// step fails the whole call.
    pub async fn multicall(
        &mut self,
        requests: &[Request],
        refresh: bool,
    ) -> Result<Deltas, Error> {
        metrics::multicall(requests.len());
        let result = self.simulate(requests, refresh).await;
        match &result {
            Ok(deltas) => tracing::debug!(tokens = deltas.len(), "multicall simulated"),
            Err(err) => {
                tracing::warn!(?err, "multicall failed");
                metrics::multicall_error(err.format_variant());
            }
        }
        result
    }

    async fn simulate(&mut self, requests: &[Request], refresh: bool) -> Result<Deltas, Error> {
        let mut executor = Executor::new(&self.math);
        let pools = self.source.pools_dictionary(refresh).await?;

        let mut deltas = Deltas::default();
        for (i, request) in requests.iter().enumerate() {
            let action = request.action_type();
            let _span = tracing::debug_span!("step", step = i, %action).entered();
            let (tokens, amounts) = match request {
                Request::Join(join) => executor.do_join(join, &pools),
                Request::Exit(exit) => executor.do_exit(exit, &pools),
                Request::Swap(swap) => executor.do_single_swap(swap, &pools),
                Request::BatchSwap(batch) => executor.do_batch_swap(batch, &pools),
            }?;
            tracing::trace!(?tokens, ?amounts, "step executed");
            deltas.merge(&tokens, &amounts)?;
            metrics::step(action);
        }
        Ok(deltas)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error("pool {0} not found")]
    PoolNotFound(PoolId),
    #[error("output reference {0} read before it was written")]
    UnresolvedReference(OutputReference),
    #[error("output reference {0} written more than once")]
    DuplicateReference(OutputReference),
    #[error("asset index {index} out of range for {len} assets")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("unsupported action type {0:?}")]
    UnsupportedAction(String),
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("invalid user data: {0}")]
    UserData(#[from] user_data::Error),
    #[error("amount {amount} of token {token} violates limit {limit}")]
    LimitExceeded {
        token: Address,
        amount: U256,
        limit: U256,
    },
    #[error("token {token} is not in pool {pool_id}")]
    TokenNotInPool { pool_id: PoolId, token: Address },
    #[error("assets do not match the tokens of pool {0}")]
    TokensMismatch(PoolId),
    #[error("cannot swap token {0} for itself")]
    SameToken(Address),
    #[error("amount overflow")]
    Overflow,
    #[error("pool {pool_id}: {source}")]
    Math {
        pool_id: PoolId,
        source: math::Error,
    },
}

impl Error {
    /// Used for metrics labels.
    pub fn format_variant(&self) -> &'static str {
        match self {
            Self::DataSource(_) => "DataSource",
            Self::PoolNotFound(_) => "PoolNotFound",
            Self::UnresolvedReference(_) => "UnresolvedReference",
            Self::DuplicateReference(_) => "DuplicateReference",
            Self::IndexOutOfRange { .. } => "IndexOutOfRange",
            Self::UnsupportedAction(_) => "UnsupportedAction",
            Self::MalformedRequest(_) => "MalformedRequest",
            Self::UserData(_) => "UserData",
            Self::LimitExceeded { .. } => "LimitExceeded",
            Self::TokenNotInPool { .. } => "TokenNotInPool",
            Self::TokensMismatch(_) => "TokensMismatch",
            Self::SameToken(_) => "SameToken",
            Self::Overflow => "Overflow",
            Self::Math { .. } => "Math",
        }
    }
}
