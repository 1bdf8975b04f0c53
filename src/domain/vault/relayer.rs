//! The relayer ledger: output references written by earlier steps of a
//! multicall and read by later ones.

use {
    super::Error,
    crate::domain::eth::U256,
    std::{
        collections::HashMap,
        fmt::{self, Display, Formatter},
    },
};

/// Amounts whose top 16 bits equal this prefix are chained references.
const CHAINED_REFERENCE_PREFIX: u64 = 0xba10;
const PREFIX_SHIFT: usize = 240;

/// A symbolic slot holding an amount computed during a multicall.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OutputReference(pub U256);

impl OutputReference {
    /// The chained reference with the given key, in the encoding the Balancer
    /// relayer uses.
    pub fn chained(key: u64) -> Self {
        Self((U256::from(CHAINED_REFERENCE_PREFIX) << PREFIX_SHIFT) | U256::from(key))
    }

    pub fn is_chained(amount: U256) -> bool {
        amount >> PREFIX_SHIFT == U256::from(CHAINED_REFERENCE_PREFIX)
    }
}

impl Display for OutputReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// An amount in a request: either a literal or a chained reference.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Amount {
    Value(U256),
    Reference(OutputReference),
}

impl From<U256> for Amount {
    fn from(amount: U256) -> Self {
        if OutputReference::is_chained(amount) {
            Self::Reference(OutputReference(amount))
        } else {
            Self::Value(amount)
        }
    }
}

/// Output references of a single multicall. Every reference is written at
/// most once.
#[derive(Debug, Default)]
pub struct Relayer {
    values: HashMap<OutputReference, U256>,
}

impl Relayer {
    pub fn write(&mut self, reference: OutputReference, value: U256) -> Result<(), Error> {
        if self.values.contains_key(&reference) {
            return Err(Error::DuplicateReference(reference));
        }
        tracing::trace!(%reference, %value, "output reference written");
        self.values.insert(reference, value);
        Ok(())
    }

    pub fn read(&self, reference: OutputReference) -> Result<U256, Error> {
        self.values
            .get(&reference)
            .copied()
            .ok_or(Error::UnresolvedReference(reference))
    }

    /// Returns literal amounts unchanged and the stored value for chained
    /// references.
    pub fn resolve(&self, amount: U256) -> Result<U256, Error> {
        match Amount::from(amount) {
            Amount::Value(value) => Ok(value),
            Amount::Reference(reference) => self.read(reference),
        }
    }
}
