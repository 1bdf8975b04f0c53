//! Unsigned fixed point numbers with 18 decimals, rounding exactly like the
//! Balancer V2 `FixedPoint` library so that simulated amounts match the
//! amounts computed on-chain to the wei.

use {
    super::{Error, log_exp},
    crate::domain::eth::U256,
    std::fmt::{self, Debug, Formatter},
};

const ONE_18: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);
const TWO_18: U256 = U256::from_limbs([2_000_000_000_000_000_000, 0, 0, 0]);
const FOUR_18: U256 = U256::from_limbs([4_000_000_000_000_000_000, 0, 0, 0]);
const MAX_POW_RELATIVE_ERROR: U256 = U256::from_limbs([10_000, 0, 0, 0]);

#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Bfp(U256);

impl Debug for Bfp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let whole = self.0 / ONE_18;
        let fraction = (self.0 % ONE_18).to_string();
        write!(f, "{whole}.{fraction:0>18}")
    }
}

impl Bfp {
    pub const fn zero() -> Self {
        Self(U256::ZERO)
    }

    pub const fn one() -> Self {
        Self(ONE_18)
    }

    /// Creates a fixed point number from its raw 18 decimal representation.
    pub const fn from_wei(num: U256) -> Self {
        Self(num)
    }

    /// The fixed point number representing `10^exp`.
    pub fn exp10(exp: u8) -> Self {
        Self(U256::from(10).pow(U256::from(exp) + U256::from(18)))
    }

    pub fn as_uint256(self) -> U256 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn add(self, other: Self) -> Result<Self, Error> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(Error::AddOverflow)
    }

    pub fn sub(self, other: Self) -> Result<Self, Error> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(Error::SubOverflow)
    }

    pub fn mul_down(self, other: Self) -> Result<Self, Error> {
        let product = self.0.checked_mul(other.0).ok_or(Error::MulOverflow)?;
        Ok(Self(product / ONE_18))
    }

    pub fn mul_up(self, other: Self) -> Result<Self, Error> {
        let product = self.0.checked_mul(other.0).ok_or(Error::MulOverflow)?;
        if product.is_zero() {
            return Ok(Self::zero());
        }
        Ok(Self((product - U256::from(1)) / ONE_18 + U256::from(1)))
    }

    pub fn div_down(self, other: Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::ZeroDivision);
        }
        let inflated = self.0.checked_mul(ONE_18).ok_or(Error::DivInternal)?;
        Ok(Self(inflated / other.0))
    }

    pub fn div_up(self, other: Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::ZeroDivision);
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }
        let inflated = self.0.checked_mul(ONE_18).ok_or(Error::DivInternal)?;
        Ok(Self((inflated - U256::from(1)) / other.0 + U256::from(1)))
    }

    /// `1 - self`, saturating at zero.
    pub fn complement(self) -> Self {
        if self.0 < ONE_18 {
            Self(ONE_18 - self.0)
        } else {
            Self::zero()
        }
    }

    /// Raises `self` to the power of `exp`, rounding the result down.
    pub fn pow_down(self, exp: Self) -> Result<Self, Error> {
        match exp.0 {
            e if e == ONE_18 => Ok(self),
            e if e == TWO_18 => self.mul_down(self),
            e if e == FOUR_18 => {
                let square = self.mul_down(self)?;
                square.mul_down(square)
            }
            _ => {
                let raw = Self(log_exp::pow(self.0, exp.0)?);
                let max_error = raw.max_pow_error()?;
                Ok(raw.sub(max_error).unwrap_or(Self::zero()))
            }
        }
    }

    /// Raises `self` to the power of `exp`, rounding the result up.
    pub fn pow_up(self, exp: Self) -> Result<Self, Error> {
        match exp.0 {
            e if e == ONE_18 => Ok(self),
            e if e == TWO_18 => self.mul_up(self),
            e if e == FOUR_18 => {
                let square = self.mul_up(self)?;
                square.mul_up(square)
            }
            _ => {
                let raw = Self(log_exp::pow(self.0, exp.0)?);
                raw.add(raw.max_pow_error()?)
            }
        }
    }

    fn max_pow_error(self) -> Result<Self, Error> {
        self.mul_up(Self(MAX_POW_RELATIVE_ERROR))?
            .add(Self(U256::from(1)))
    }
}
