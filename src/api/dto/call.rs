//! Call descriptors emitted by the transaction encoding layer. A descriptor
//! is a JSON object tagged by `actionType`; translation into a typed request
//! is pure and field-for-field.

use {
    crate::{
        domain::{
            pool::{PoolId, math},
            vault::{
                ActionType,
                Error,
                OutputReference,
                Request,
                request::{self, OutputReferenceIndex},
            },
        },
        util::serialize,
    },
    alloy::primitives::{Address, B256, I256, U256},
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::Value,
    serde_with::serde_as,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Call(pub Value);

impl Call {
    /// Translates the descriptor into a typed request. Fails with
    /// [`Error::UnsupportedAction`] for unknown action types and with
    /// [`Error::MalformedRequest`] when the fields do not match the action
    /// type.
    pub fn to_domain(&self) -> Result<Request, Error> {
        let Value::Object(fields) = &self.0 else {
            return Err(Error::MalformedRequest("call descriptor is not an object".into()));
        };
        let mut fields = fields.clone();
        let action = match fields.remove("actionType") {
            Some(Value::String(action)) => action,
            Some(other) => return Err(Error::UnsupportedAction(other.to_string())),
            None => return Err(Error::MalformedRequest("missing actionType".into())),
        };
        let fields = Value::Object(fields);

        Ok(match action.as_str() {
            "join" => Request::Join(parse::<Join>(fields, ActionType::Join)?.into_domain()?),
            "exit" => Request::Exit(parse::<Exit>(fields, ActionType::Exit)?.into_domain()?),
            "swap" => Request::Swap(parse::<Swap>(fields, ActionType::Swap)?.into_domain()?),
            "batchSwap" => Request::BatchSwap(
                parse::<BatchSwap>(fields, ActionType::BatchSwap)?.into_domain()?,
            ),
            _ => return Err(Error::UnsupportedAction(action)),
        })
    }
}

fn parse<T: DeserializeOwned>(fields: Value, action: ActionType) -> Result<T, Error> {
    serde_json::from_value(fields)
        .map_err(|err| Error::MalformedRequest(format!("{action}: {err}")))
}

/// Output references must use the chained reference encoding.
fn output_reference(key: U256) -> Result<OutputReference, Error> {
    if !OutputReference::is_chained(key) {
        return Err(Error::MalformedRequest(format!(
            "{key:#x} is not a chained output reference"
        )));
    }
    Ok(OutputReference(key))
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Join {
    pool_id: B256,
    sender: Address,
    recipient: Address,
    assets: Vec<Address>,
    #[serde_as(as = "Vec<serialize::U256>")]
    #[serde(default)]
    max_amounts_in: Vec<U256>,
    #[serde_as(as = "serialize::Hex")]
    user_data: Vec<u8>,
    #[serde(default)]
    from_internal_balance: bool,
    #[serde_as(as = "Option<serialize::U256>")]
    output_reference: Option<U256>,
}

impl Join {
    fn into_domain(self) -> Result<request::JoinRequest, Error> {
        Ok(request::JoinRequest {
            pool_id: PoolId(self.pool_id),
            sender: self.sender,
            recipient: self.recipient,
            assets: self.assets,
            max_amounts_in: self.max_amounts_in,
            user_data: self.user_data.into(),
            from_internal_balance: self.from_internal_balance,
            output_reference: self.output_reference.map(output_reference).transpose()?,
        })
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Exit {
    pool_id: B256,
    sender: Address,
    recipient: Address,
    assets: Vec<Address>,
    #[serde_as(as = "Vec<serialize::U256>")]
    #[serde(default)]
    min_amounts_out: Vec<U256>,
    #[serde_as(as = "serialize::Hex")]
    user_data: Vec<u8>,
    #[serde(default)]
    to_internal_balance: bool,
    #[serde(default)]
    output_references: Vec<ReferenceIndex>,
}

impl Exit {
    fn into_domain(self) -> Result<request::ExitRequest, Error> {
        Ok(request::ExitRequest {
            pool_id: PoolId(self.pool_id),
            sender: self.sender,
            recipient: self.recipient,
            assets: self.assets,
            min_amounts_out: self.min_amounts_out,
            user_data: self.user_data.into(),
            to_internal_balance: self.to_internal_balance,
            output_references: output_references(self.output_references)?,
        })
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Swap {
    single_swap: SingleSwap,
    funds: Funds,
    #[serde_as(as = "Option<serialize::U256>")]
    limit: Option<U256>,
    #[serde_as(as = "Option<serialize::U256>")]
    output_reference: Option<U256>,
}

impl Swap {
    fn into_domain(self) -> Result<request::SwapRequest, Error> {
        let swap = self.single_swap;
        Ok(request::SwapRequest {
            single_swap: request::SingleSwap {
                pool_id: PoolId(swap.pool_id),
                kind: swap.kind.to_domain(),
                asset_in: swap.asset_in,
                asset_out: swap.asset_out,
                amount: swap.amount,
                user_data: swap.user_data.into(),
            },
            funds: self.funds.to_domain(),
            limit: self.limit,
            output_reference: self.output_reference.map(output_reference).transpose()?,
        })
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SingleSwap {
    pool_id: B256,
    kind: SwapKind,
    asset_in: Address,
    asset_out: Address,
    #[serde_as(as = "serialize::U256")]
    amount: U256,
    #[serde_as(as = "serialize::Hex")]
    #[serde(default)]
    user_data: Vec<u8>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct BatchSwap {
    kind: SwapKind,
    swaps: Vec<BatchSwapStep>,
    assets: Vec<Address>,
    funds: Funds,
    #[serde_as(as = "Vec<serialize::I256>")]
    #[serde(default)]
    limits: Vec<I256>,
    #[serde(default)]
    output_references: Vec<ReferenceIndex>,
}

impl BatchSwap {
    fn into_domain(self) -> Result<request::BatchSwapRequest, Error> {
        Ok(request::BatchSwapRequest {
            kind: self.kind.to_domain(),
            swaps: self
                .swaps
                .into_iter()
                .map(|step| request::BatchSwapStep {
                    pool_id: PoolId(step.pool_id),
                    asset_in_index: step.asset_in_index,
                    asset_out_index: step.asset_out_index,
                    amount: step.amount,
                    user_data: step.user_data.into(),
                })
                .collect(),
            assets: self.assets,
            funds: self.funds.to_domain(),
            limits: self.limits,
            output_references: output_references(self.output_references)?,
        })
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct BatchSwapStep {
    pool_id: B256,
    asset_in_index: usize,
    asset_out_index: usize,
    #[serde_as(as = "serialize::U256")]
    amount: U256,
    #[serde_as(as = "serialize::Hex")]
    #[serde(default)]
    user_data: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum SwapKind {
    GivenIn,
    GivenOut,
}

impl SwapKind {
    fn to_domain(&self) -> math::SwapKind {
        match self {
            Self::GivenIn => math::SwapKind::GivenIn,
            Self::GivenOut => math::SwapKind::GivenOut,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Funds {
    sender: Address,
    #[serde(default)]
    from_internal_balance: bool,
    recipient: Address,
    #[serde(default)]
    to_internal_balance: bool,
}

impl Funds {
    fn to_domain(&self) -> request::Funds {
        request::Funds {
            sender: self.sender,
            from_internal_balance: self.from_internal_balance,
            recipient: self.recipient,
            to_internal_balance: self.to_internal_balance,
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferenceIndex {
    index: usize,
    #[serde_as(as = "serialize::U256")]
    key: U256,
}

fn output_references(references: Vec<ReferenceIndex>) -> Result<Vec<OutputReferenceIndex>, Error> {
    references
        .into_iter()
        .map(|reference| {
            Ok(OutputReferenceIndex {
                index: reference.index,
                key: output_reference(reference.key)?,
            })
        })
        .collect()
}
