//! Typed operation requests replayed by the vault model.

use {
    super::relayer::OutputReference,
    crate::domain::{
        eth::{Address, Bytes, I256, U256},
        pool::{PoolId, math::SwapKind},
    },
    std::fmt::{self, Display, Formatter},
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ActionType {
    Join,
    Exit,
    Swap,
    BatchSwap,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Exit => "exit",
            Self::Swap => "swap",
            Self::BatchSwap => "batchSwap",
        }
    }
}

impl Display for ActionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a multicall.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    Join(JoinRequest),
    Exit(ExitRequest),
    Swap(SwapRequest),
    BatchSwap(BatchSwapRequest),
}

impl Request {
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Join(_) => ActionType::Join,
            Self::Exit(_) => ActionType::Exit,
            Self::Swap(_) => ActionType::Swap,
            Self::BatchSwap(_) => ActionType::BatchSwap,
        }
    }
}

/// Where tokens come from and go to. Balances are not simulated, so this is
/// carried along for completeness only.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Funds {
    pub sender: Address,
    pub from_internal_balance: bool,
    pub recipient: Address,
    pub to_internal_balance: bool,
}

/// Records the amount of the asset at `index` under `key`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OutputReferenceIndex {
    pub index: usize,
    pub key: OutputReference,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinRequest {
    pub pool_id: PoolId,
    pub sender: Address,
    pub recipient: Address,
    /// The pool tokens, in pool order.
    pub assets: Vec<Address>,
    /// Per asset upper bounds on the amounts paid in. Empty for no bounds.
    pub max_amounts_in: Vec<U256>,
    /// ABI encoded join kind and parameters.
    pub user_data: Bytes,
    pub from_internal_balance: bool,
    /// Receives the amount of BPT minted.
    pub output_reference: Option<OutputReference>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExitRequest {
    pub pool_id: PoolId,
    pub sender: Address,
    pub recipient: Address,
    /// The pool tokens, in pool order.
    pub assets: Vec<Address>,
    /// Per asset lower bounds on the amounts paid out. Empty for no bounds.
    pub min_amounts_out: Vec<U256>,
    /// ABI encoded exit kind and parameters.
    pub user_data: Bytes,
    pub to_internal_balance: bool,
    pub output_references: Vec<OutputReferenceIndex>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SingleSwap {
    pub pool_id: PoolId,
    pub kind: SwapKind,
    pub asset_in: Address,
    pub asset_out: Address,
    /// Literal amount or chained reference.
    pub amount: U256,
    pub user_data: Bytes,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapRequest {
    pub single_swap: SingleSwap,
    pub funds: Funds,
    /// Minimum amount out for given in swaps, maximum amount in for given out
    /// swaps.
    pub limit: Option<U256>,
    /// Receives the computed amount.
    pub output_reference: Option<OutputReference>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchSwapStep {
    pub pool_id: PoolId,
    pub asset_in_index: usize,
    pub asset_out_index: usize,
    /// Literal amount or chained reference.
    pub amount: U256,
    pub user_data: Bytes,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchSwapRequest {
    pub kind: SwapKind,
    pub swaps: Vec<BatchSwapStep>,
    pub assets: Vec<Address>,
    pub funds: Funds,
    /// Per asset limits on what the vault may take, following the vault's own
    /// sign convention: positive limits cap the amount paid in, negative
    /// limits set a minimum amount paid out. Empty for no limits.
    pub limits: Vec<I256>,
    pub output_references: Vec<OutputReferenceIndex>,
}
