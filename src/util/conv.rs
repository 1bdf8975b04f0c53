//! Conversion utilities.

use {
    alloy::primitives::{I256, U256},
    bigdecimal::{BigDecimal, num_bigint::ToBigInt},
    num::{BigInt, BigUint, Signed},
};

pub fn biguint_to_u256(i: &BigUint) -> Option<U256> {
    let bytes = i.to_bytes_be();
    if bytes.len() > 32 {
        return None;
    }
    Some(U256::from_be_slice(&bytes))
}

pub fn u256_to_biguint(i: &U256) -> BigUint {
    BigUint::from_bytes_be(&i.to_be_bytes::<32>())
}

pub fn u256_to_bigint(i: &U256) -> BigInt {
    u256_to_biguint(i).into()
}

pub fn bigint_to_u256(i: &BigInt) -> Option<U256> {
    if i.is_negative() {
        return None;
    }
    biguint_to_u256(i.magnitude())
}

/// Converts a human readable decimal amount into its raw integer
/// representation with the specified number of decimals. Returns `None` if the
/// value is negative, has more precision than `decimals` allows, or does not
/// fit in a `U256`.
pub fn decimal_to_raw(d: &BigDecimal, decimals: u8) -> Option<U256> {
    let scaled = d * BigDecimal::new(BigInt::from(1), -i64::from(decimals));
    if scaled.with_scale(0) != scaled {
        return None;
    }
    bigint_to_u256(&scaled.to_bigint()?)
}

/// Converts a raw amount into a signed integer, failing when the value does
/// not fit in an `I256`.
pub fn u256_to_i256(i: U256) -> Option<I256> {
    I256::try_from(i).ok()
}
