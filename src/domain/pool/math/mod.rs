//! Per pool type join, exit and swap math.
//!
//! Every pool type provides a [`PoolMath`] implementation. The simulation
//! selects the implementation from a [`Registry`] using the pool's type tag,
//! so adding a pool type never touches the executor.

use {
    super::{Pool, PoolKind, PoolType, Token},
    crate::domain::eth::U256,
    fixed_point::Bfp,
    std::{collections::HashMap, sync::Arc},
};

pub mod fixed_point;
pub mod log_exp;
pub mod stable;
pub mod weighted;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwapKind {
    /// The amount is the exact amount in; the amount out is computed.
    GivenIn,
    /// The amount is the exact amount out; the amount in is computed.
    GivenOut,
}

/// A swap between two tokens of the same pool, by token index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Swap {
    pub kind: SwapKind,
    pub token_in: usize,
    pub token_out: usize,
    pub amount: U256,
}

/// A decoded join request. Token amounts are in token order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Join {
    Init {
        amounts_in: Vec<U256>,
    },
    ExactTokensInForBptOut {
        amounts_in: Vec<U256>,
        min_bpt_out: U256,
    },
    TokenInForExactBptOut {
        bpt_out: U256,
        token_index: usize,
    },
    AllTokensInForExactBptOut {
        bpt_out: U256,
    },
}

impl Join {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init join",
            Self::ExactTokensInForBptOut { .. } => "exact tokens in join",
            Self::TokenInForExactBptOut { .. } => "single token in join",
            Self::AllTokensInForExactBptOut { .. } => "proportional join",
        }
    }

    /// Applies `f` to every amount carried by the join.
    pub fn try_map_amounts<E>(
        self,
        mut f: impl FnMut(U256) -> Result<U256, E>,
    ) -> Result<Self, E> {
        Ok(match self {
            Self::Init { amounts_in } => Self::Init {
                amounts_in: amounts_in.into_iter().map(&mut f).collect::<Result<_, _>>()?,
            },
            Self::ExactTokensInForBptOut {
                amounts_in,
                min_bpt_out,
            } => Self::ExactTokensInForBptOut {
                amounts_in: amounts_in.into_iter().map(&mut f).collect::<Result<_, _>>()?,
                min_bpt_out,
            },
            Self::TokenInForExactBptOut {
                bpt_out,
                token_index,
            } => Self::TokenInForExactBptOut {
                bpt_out: f(bpt_out)?,
                token_index,
            },
            Self::AllTokensInForExactBptOut { bpt_out } => Self::AllTokensInForExactBptOut {
                bpt_out: f(bpt_out)?,
            },
        })
    }
}

/// A decoded exit request. Token amounts are in token order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Exit {
    ExactBptInForOneTokenOut {
        bpt_in: U256,
        token_index: usize,
    },
    ExactBptInForTokensOut {
        bpt_in: U256,
    },
    BptInForExactTokensOut {
        amounts_out: Vec<U256>,
        max_bpt_in: U256,
    },
}

impl Exit {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExactBptInForOneTokenOut { .. } => "single token out exit",
            Self::ExactBptInForTokensOut { .. } => "proportional exit",
            Self::BptInForExactTokensOut { .. } => "exact tokens out exit",
        }
    }

    /// Applies `f` to every amount carried by the exit.
    pub fn try_map_amounts<E>(
        self,
        mut f: impl FnMut(U256) -> Result<U256, E>,
    ) -> Result<Self, E> {
        Ok(match self {
            Self::ExactBptInForOneTokenOut {
                bpt_in,
                token_index,
            } => Self::ExactBptInForOneTokenOut {
                bpt_in: f(bpt_in)?,
                token_index,
            },
            Self::ExactBptInForTokensOut { bpt_in } => Self::ExactBptInForTokensOut {
                bpt_in: f(bpt_in)?,
            },
            Self::BptInForExactTokensOut {
                amounts_out,
                max_bpt_in,
            } => Self::BptInForExactTokensOut {
                amounts_out: amounts_out.into_iter().map(&mut f).collect::<Result<_, _>>()?,
                max_bpt_in,
            },
        })
    }
}

/// Raw amounts of a join: BPT minted and token amounts paid in, in token
/// order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinOutcome {
    pub bpt_out: U256,
    pub amounts_in: Vec<U256>,
}

/// Raw amounts of an exit: BPT burned and token amounts paid out, in token
/// order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExitOutcome {
    pub bpt_in: U256,
    pub amounts_out: Vec<U256>,
}

/// Math for one pool type. Implementations are pure functions of the pool
/// state and the request.
#[cfg_attr(test, mockall::automock)]
pub trait PoolMath: Send + Sync {
    /// Returns the computed amount: the amount out for [`SwapKind::GivenIn`]
    /// swaps and the amount in for [`SwapKind::GivenOut`] swaps.
    fn swap(&self, pool: &Pool, swap: &Swap) -> Result<U256, Error>;
    fn join(&self, pool: &Pool, join: &Join) -> Result<JoinOutcome, Error>;
    fn exit(&self, pool: &Pool, exit: &Exit) -> Result<ExitOutcome, Error>;
}

/// Pool math implementations by pool type.
#[derive(Clone)]
pub struct Registry(HashMap<PoolType, Arc<dyn PoolMath>>);

impl Registry {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Registers `math` for `pool_type`, replacing any previous registration.
    pub fn with(mut self, pool_type: PoolType, math: impl PoolMath + 'static) -> Self {
        self.0.insert(pool_type, Arc::new(math));
        self
    }

    pub fn get(&self, pool_type: PoolType) -> Result<&dyn PoolMath, Error> {
        self.0
            .get(&pool_type)
            .map(|math| &**math)
            .ok_or(Error::UnsupportedPool(pool_type))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::empty()
            .with(PoolType::Weighted, weighted::WeightedMath)
            .with(PoolType::Stable, stable::StableMath)
    }
}

/// Balancer error conditions that abort a simulation step.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("addition overflow")]
    AddOverflow,
    #[error("subtraction overflow")]
    SubOverflow,
    #[error("multiplication overflow")]
    MulOverflow,
    #[error("division by zero")]
    ZeroDivision,
    #[error("division overflow")]
    DivInternal,
    #[error("power base out of bounds")]
    XOutOfBounds,
    #[error("power exponent out of bounds")]
    YOutOfBounds,
    #[error("power result out of bounds")]
    ProductOutOfBounds,
    #[error("invalid natural exponent")]
    InvalidExponent,
    #[error("amount in exceeds the maximum in ratio")]
    MaxInRatio,
    #[error("amount out exceeds the maximum out ratio")]
    MaxOutRatio,
    #[error("BPT out exceeds the maximum for a single token join")]
    MaxOutBptForTokenIn,
    #[error("BPT in exceeds the maximum for a single token exit")]
    MinBptInForTokenOut,
    #[error("BPT out below the requested minimum")]
    BptOutMinAmount,
    #[error("BPT in above the requested maximum")]
    BptInMaxAmount,
    #[error("stable invariant did not converge")]
    StableInvariantDidntConverge,
    #[error("stable balance did not converge")]
    StableGetBalanceDidntConverge,
    #[error("token index {0} out of range")]
    InvalidToken(usize),
    #[error("expected {expected} token amounts but got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("{0} pools do not support {1}s")]
    UnsupportedKind(PoolType, &'static str),
    #[error("no math registered for {0} pools")]
    UnsupportedPool(PoolType),
    #[error("pool parameters are not those of a {0} pool")]
    KindMismatch(PoolType),
}

/// Converts the raw token amount to the 18 decimal value pool math works
/// with.
fn upscale(token: &Token, amount: U256) -> Result<Bfp, Error> {
    Bfp::from_wei(amount).mul_down(scaling_factor(token))
}

fn downscale_down(token: &Token, amount: Bfp) -> Result<U256, Error> {
    Ok(amount.div_down(scaling_factor(token))?.as_uint256())
}

fn downscale_up(token: &Token, amount: Bfp) -> Result<U256, Error> {
    Ok(amount.div_up(scaling_factor(token))?.as_uint256())
}

fn scaling_factor(token: &Token) -> Bfp {
    Bfp::exp10(18_u8.saturating_sub(token.decimals))
}

/// Upscaled balances of all pool tokens.
fn upscaled_balances(pool: &Pool) -> Result<Vec<Bfp>, Error> {
    pool.tokens
        .iter()
        .map(|token| upscale(token, token.balance))
        .collect()
}

/// Upscales an amount per token, checking that there is exactly one amount
/// for every pool token.
fn upscale_amounts(pool: &Pool, amounts: &[U256]) -> Result<Vec<Bfp>, Error> {
    if amounts.len() != pool.tokens.len() {
        return Err(Error::LengthMismatch {
            expected: pool.tokens.len(),
            actual: amounts.len(),
        });
    }
    pool.tokens
        .iter()
        .zip(amounts)
        .map(|(token, amount)| upscale(token, *amount))
        .collect()
}

fn token(pool: &Pool, index: usize) -> Result<&Token, Error> {
    pool.tokens.get(index).ok_or(Error::InvalidToken(index))
}

fn check_swap_tokens(pool: &Pool, swap: &Swap) -> Result<(), Error> {
    token(pool, swap.token_in)?;
    token(pool, swap.token_out)?;
    Ok(())
}

fn weights(pool: &Pool) -> Result<&[Bfp], Error> {
    match &pool.kind {
        PoolKind::Weighted { weights } => Ok(weights),
        _ => Err(Error::KindMismatch(PoolType::Weighted)),
    }
}

fn amplification(pool: &Pool) -> Result<U256, Error> {
    match &pool.kind {
        PoolKind::Stable { amplification } => Ok(*amplification),
        _ => Err(Error::KindMismatch(PoolType::Stable)),
    }
}

/// Takes the swap fee from an exact amount in.
fn subtract_swap_fee_amount(amount: Bfp, swap_fee: Bfp) -> Result<Bfp, Error> {
    amount.sub(amount.mul_up(swap_fee)?)
}

/// Grosses up a computed amount in so that the swap fee is covered.
fn add_swap_fee_amount(amount: Bfp, swap_fee: Bfp) -> Result<Bfp, Error> {
    amount.div_up(swap_fee.complement())
}

/// Token amounts in for minting `bpt_out` proportionally to the balances.
fn proportional_amounts_in(
    balances: &[Bfp],
    total_shares: Bfp,
    bpt_out: Bfp,
) -> Result<Vec<Bfp>, Error> {
    let ratio = bpt_out.div_up(total_shares)?;
    balances.iter().map(|b| b.mul_up(ratio)).collect()
}

/// Token amounts out for burning `bpt_in` proportionally to the balances.
fn proportional_amounts_out(
    balances: &[Bfp],
    total_shares: Bfp,
    bpt_in: Bfp,
) -> Result<Vec<Bfp>, Error> {
    let ratio = bpt_in.div_down(total_shares)?;
    balances.iter().map(|b| b.mul_down(ratio)).collect()
}

fn downscale_amounts(
    pool: &Pool,
    amounts: Vec<Bfp>,
    downscale: fn(&Token, Bfp) -> Result<U256, Error>,
) -> Result<Vec<U256>, Error> {
    pool.tokens
        .iter()
        .zip(amounts)
        .map(|(token, amount)| downscale(token, amount))
        .collect()
}
