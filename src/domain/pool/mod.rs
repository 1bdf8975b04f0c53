//! Pool entities as seen by the simulation. Pools are read-only for the
//! duration of a simulation and are only ever replaced as a whole.

use {
    crate::domain::eth::{Address, B256, U256},
    math::fixed_point::Bfp,
    std::{
        collections::{HashMap, HashSet},
        fmt::{self, Display, Formatter},
        str::FromStr,
    },
};

pub mod math;
pub mod source;

/// A 32 byte Balancer pool id. The leading 20 bytes are the address of the
/// pool's BPT token.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PoolId(pub B256);

impl PoolId {
    pub fn address(&self) -> Address {
        Address::from_slice(&self.0[..20])
    }
}

impl Display for PoolId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PoolId {
    type Err = alloy::primitives::hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s).map(Self)
    }
}

/// The tag used to select the math implementation for a pool.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PoolType {
    Weighted,
    Stable,
}

impl Display for PoolType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Weighted => "weighted",
            Self::Stable => "stable",
        })
    }
}

/// Type specific pool parameters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PoolKind {
    /// Normalized weights, one per token, summing up to one.
    Weighted { weights: Vec<Bfp> },
    /// The amplification parameter including the contract's precision of
    /// 1000 (i.e. `A = 200` is stored as `200_000`).
    Stable { amplification: U256 },
}

impl PoolKind {
    pub fn pool_type(&self) -> PoolType {
        match self {
            Self::Weighted { .. } => PoolType::Weighted,
            Self::Stable { .. } => PoolType::Stable,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
    /// Raw balance in the token's own decimals.
    pub balance: U256,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub id: PoolId,
    pub kind: PoolKind,
    pub tokens: Vec<Token>,
    pub swap_fee: Bfp,
    /// Total BPT supply, always with 18 decimals.
    pub total_shares: U256,
}

impl Pool {
    /// The BPT token address.
    pub fn address(&self) -> Address {
        self.id.address()
    }

    pub fn pool_type(&self) -> PoolType {
        self.kind.pool_type()
    }

    pub fn token_index(&self, token: Address) -> Option<usize> {
        self.tokens.iter().position(|t| t.address == token)
    }

    pub fn token_addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.tokens.iter().map(|t| t.address)
    }

    /// Checks that the pool parameters are consistent enough for the pool
    /// math to work with.
    pub fn validate(&self) -> Result<(), InvalidPool> {
        let id = self.id;
        if self.tokens.len() < 2 {
            return Err(InvalidPool::TooFewTokens(id));
        }
        let mut seen = HashSet::new();
        for token in &self.tokens {
            if token.decimals > 18 {
                return Err(InvalidPool::Decimals(id, token.address, token.decimals));
            }
            if !seen.insert(token.address) {
                return Err(InvalidPool::DuplicateToken(id, token.address));
            }
        }
        if self.swap_fee >= Bfp::one() {
            return Err(InvalidPool::SwapFee(id));
        }
        match &self.kind {
            PoolKind::Weighted { weights } => {
                if weights.len() != self.tokens.len() {
                    return Err(InvalidPool::WeightCount(id, weights.len(), self.tokens.len()));
                }
                if weights.iter().any(|w| w.is_zero()) {
                    return Err(InvalidPool::ZeroWeight(id));
                }
            }
            PoolKind::Stable { amplification } => {
                if amplification.is_zero() {
                    return Err(InvalidPool::ZeroAmplification(id));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidPool {
    #[error("pool {0} has fewer than two tokens")]
    TooFewTokens(PoolId),
    #[error("pool {0} token {1} has {2} decimals")]
    Decimals(PoolId, Address, u8),
    #[error("pool {0} lists token {1} more than once")]
    DuplicateToken(PoolId, Address),
    #[error("pool {0} swap fee is not below 100%")]
    SwapFee(PoolId),
    #[error("pool {0} has {1} weights for {2} tokens")]
    WeightCount(PoolId, usize, usize),
    #[error("pool {0} has a zero weight")]
    ZeroWeight(PoolId),
    #[error("pool {0} has a zero amplification parameter")]
    ZeroAmplification(PoolId),
}

/// All pools known to a simulation, by id.
pub type Pools = HashMap<PoolId, Pool>;
