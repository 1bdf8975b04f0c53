use {
    super::Error,
    crate::domain::eth::{Address, I256},
    std::collections::BTreeMap,
};

/// Net token amounts of a multicall from the user's point of view: negative
/// amounts are paid in by the user, positive amounts are received. BPT is
/// keyed by the pool address.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Deltas(BTreeMap<Address, I256>);

impl Deltas {
    /// Adds the amounts of one step. A token touched by several steps
    /// accumulates. Every token needs exactly one amount.
    pub fn merge(&mut self, tokens: &[Address], amounts: &[I256]) -> Result<(), Error> {
        if tokens.len() != amounts.len() {
            return Err(Error::MalformedRequest(format!(
                "{} tokens but {} amounts",
                tokens.len(),
                amounts.len()
            )));
        }
        for (token, amount) in tokens.iter().zip(amounts) {
            let total = self.0.entry(*token).or_default();
            *total = total.checked_add(*amount).ok_or(Error::Overflow)?;
        }
        Ok(())
    }

    /// The delta of `token`, zero if no step touched it.
    pub fn get(&self, token: &Address) -> I256 {
        self.0.get(token).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &I256)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<Address, I256> {
        self.0
    }
}
