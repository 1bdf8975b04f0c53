pub use alloy::primitives::{Address, B256, Bytes, I256, U256};
