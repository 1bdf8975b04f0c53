//! Serialization helpers for use with `serde_with`.

mod hex;
mod i256;
mod u256;

pub use self::{hex::Hex, i256::I256, u256::U256};
