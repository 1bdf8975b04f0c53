//! ABI encoding of join and exit user data.

use {
    crate::domain::{
        eth::{Bytes, U256},
        pool::math::{Exit, Join},
    },
    alloy::sol_types::{SolType, sol_data},
};

type Uint = sol_data::Uint<256>;
type Uints = sol_data::Array<sol_data::Uint<256>>;

mod join_kind {
    pub const INIT: u8 = 0;
    pub const EXACT_TOKENS_IN_FOR_BPT_OUT: u8 = 1;
    pub const TOKEN_IN_FOR_EXACT_BPT_OUT: u8 = 2;
    pub const ALL_TOKENS_IN_FOR_EXACT_BPT_OUT: u8 = 3;
}

mod exit_kind {
    pub const EXACT_BPT_IN_FOR_ONE_TOKEN_OUT: u8 = 0;
    pub const EXACT_BPT_IN_FOR_TOKENS_OUT: u8 = 1;
    pub const BPT_IN_FOR_EXACT_TOKENS_OUT: u8 = 2;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("user data too short to hold a kind")]
    MissingKind,
    #[error("unknown {0} kind {1}")]
    UnknownKind(&'static str, U256),
    #[error("token index {0} out of range")]
    TokenIndex(U256),
    #[error(transparent)]
    Abi(#[from] alloy::sol_types::Error),
}

fn kind(data: &[u8]) -> Result<U256, Error> {
    let word = data.get(..32).ok_or(Error::MissingKind)?;
    Ok(U256::from_be_slice(word))
}

fn token_index(index: U256) -> Result<usize, Error> {
    usize::try_from(index).map_err(|_| Error::TokenIndex(index))
}

pub fn decode_join(data: &[u8]) -> Result<Join, Error> {
    let kind = kind(data)?;
    Ok(match u8::try_from(kind) {
        Ok(join_kind::INIT) => {
            let (_, amounts_in) = <(Uint, Uints)>::abi_decode_params(data)?;
            Join::Init { amounts_in }
        }
        Ok(join_kind::EXACT_TOKENS_IN_FOR_BPT_OUT) => {
            let (_, amounts_in, min_bpt_out) = <(Uint, Uints, Uint)>::abi_decode_params(data)?;
            Join::ExactTokensInForBptOut {
                amounts_in,
                min_bpt_out,
            }
        }
        Ok(join_kind::TOKEN_IN_FOR_EXACT_BPT_OUT) => {
            let (_, bpt_out, index) = <(Uint, Uint, Uint)>::abi_decode_params(data)?;
            Join::TokenInForExactBptOut {
                bpt_out,
                token_index: token_index(index)?,
            }
        }
        Ok(join_kind::ALL_TOKENS_IN_FOR_EXACT_BPT_OUT) => {
            let (_, bpt_out) = <(Uint, Uint)>::abi_decode_params(data)?;
            Join::AllTokensInForExactBptOut { bpt_out }
        }
        _ => return Err(Error::UnknownKind("join", kind)),
    })
}

pub fn decode_exit(data: &[u8]) -> Result<Exit, Error> {
    let kind = kind(data)?;
    Ok(match u8::try_from(kind) {
        Ok(exit_kind::EXACT_BPT_IN_FOR_ONE_TOKEN_OUT) => {
            let (_, bpt_in, index) = <(Uint, Uint, Uint)>::abi_decode_params(data)?;
            Exit::ExactBptInForOneTokenOut {
                bpt_in,
                token_index: token_index(index)?,
            }
        }
        Ok(exit_kind::EXACT_BPT_IN_FOR_TOKENS_OUT) => {
            let (_, bpt_in) = <(Uint, Uint)>::abi_decode_params(data)?;
            Exit::ExactBptInForTokensOut { bpt_in }
        }
        Ok(exit_kind::BPT_IN_FOR_EXACT_TOKENS_OUT) => {
            let (_, amounts_out, max_bpt_in) = <(Uint, Uints, Uint)>::abi_decode_params(data)?;
            Exit::BptInForExactTokensOut {
                amounts_out,
                max_bpt_in,
            }
        }
        _ => return Err(Error::UnknownKind("exit", kind)),
    })
}

pub fn encode_join(join: &Join) -> Bytes {
    let kind = |k: u8| U256::from(k);
    let data = match join {
        Join::Init { amounts_in } => {
            <(Uint, Uints)>::abi_encode_params(&(kind(join_kind::INIT), amounts_in.clone()))
        }
        Join::ExactTokensInForBptOut {
            amounts_in,
            min_bpt_out,
        } => <(Uint, Uints, Uint)>::abi_encode_params(&(
            kind(join_kind::EXACT_TOKENS_IN_FOR_BPT_OUT),
            amounts_in.clone(),
            *min_bpt_out,
        )),
        Join::TokenInForExactBptOut {
            bpt_out,
            token_index,
        } => <(Uint, Uint, Uint)>::abi_encode_params(&(
            kind(join_kind::TOKEN_IN_FOR_EXACT_BPT_OUT),
            *bpt_out,
            U256::from(*token_index),
        )),
        Join::AllTokensInForExactBptOut { bpt_out } => <(Uint, Uint)>::abi_encode_params(&(
            kind(join_kind::ALL_TOKENS_IN_FOR_EXACT_BPT_OUT),
            *bpt_out,
        )),
    };
    data.into()
}

pub fn encode_exit(exit: &Exit) -> Bytes {
    let kind = |k: u8| U256::from(k);
    let data = match exit {
        Exit::ExactBptInForOneTokenOut {
            bpt_in,
            token_index,
        } => <(Uint, Uint, Uint)>::abi_encode_params(&(
            kind(exit_kind::EXACT_BPT_IN_FOR_ONE_TOKEN_OUT),
            *bpt_in,
            U256::from(*token_index),
        )),
        Exit::ExactBptInForTokensOut { bpt_in } => <(Uint, Uint)>::abi_encode_params(&(
            kind(exit_kind::EXACT_BPT_IN_FOR_TOKENS_OUT),
            *bpt_in,
        )),
        Exit::BptInForExactTokensOut {
            amounts_out,
            max_bpt_in,
        } => <(Uint, Uints, Uint)>::abi_encode_params(&(
            kind(exit_kind::BPT_IN_FOR_EXACT_TOKENS_OUT),
            amounts_out.clone(),
            *max_bpt_in,
        )),
    };
    data.into()
}
