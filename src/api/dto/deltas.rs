use {
    crate::{domain::vault, util::serialize},
    alloy::primitives::{Address, I256},
    serde::Serialize,
    serde_with::serde_as,
    std::collections::BTreeMap,
};

/// Token deltas keyed by token address, as signed decimal strings. Negative
/// amounts are paid in by the user.
#[serde_as]
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Deltas(#[serde_as(as = "BTreeMap<_, serialize::I256>")] BTreeMap<Address, I256>);

impl Deltas {
    pub fn from_domain(deltas: &vault::Deltas) -> Self {
        Self(deltas.iter().map(|(token, amount)| (*token, *amount)).collect())
    }
}
