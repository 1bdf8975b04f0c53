use {
    super::Error,
    crate::{
        domain::{
            eth::{Address, B256, U256},
            pool::{self, math::fixed_point::Bfp},
        },
        util::conv,
    },
    bigdecimal::BigDecimal,
    serde::{Deserialize, Serialize},
    serde_with::{DisplayFromStr, serde_as},
};

pub mod pools_query {
    /// Lists pools of the supported types, one page at a time.
    pub const QUERY: &str = r#"
query pools($first: Int!, $skip: Int!, $poolTypes: [String!]!) {
    pools(
        first: $first,
        skip: $skip,
        orderBy: id,
        where: { poolType_in: $poolTypes, totalShares_gt: "0" }
    ) {
        id
        address
        poolType
        swapFee
        totalShares
        amp
        tokens(orderBy: index) {
            address
            decimals
            balance
            weight
        }
    }
}
    "#;

    /// Same as [`QUERY`] restricted to an explicit list of pool ids.
    pub const BY_ID_QUERY: &str = r#"
query pools($first: Int!, $skip: Int!, $poolTypes: [String!]!, $ids: [ID!]!) {
    pools(
        first: $first,
        skip: $skip,
        orderBy: id,
        where: { poolType_in: $poolTypes, id_in: $ids }
    ) {
        id
        address
        poolType
        swapFee
        totalShares
        amp
        tokens(orderBy: index) {
            address
            decimals
            balance
            weight
        }
    }
}
    "#;
}

/// Subgraph pool types and the math they are simulated with. Liquidity
/// bootstrapping pools are weighted pools with time dependent weights, the
/// subgraph reports the current ones.
pub const POOL_TYPES: &[&str] = &["Weighted", "LiquidityBootstrapping", "Stable"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Query<'a> {
    query: &'static str,
    variables: Variables<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables<'a> {
    first: usize,
    skip: usize,
    pool_types: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    ids: Option<&'a [String]>,
}

impl<'a> Query<'a> {
    pub fn page(first: usize, skip: usize, ids: Option<&'a [String]>) -> Self {
        Self {
            query: match ids {
                Some(_) => pools_query::BY_ID_QUERY,
                None => pools_query::QUERY,
            },
            variables: Variables {
                first,
                skip,
                pool_types: POOL_TYPES,
                ids,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Response {
    pub data: Option<Data>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Data {
    pub pools: Vec<Pool>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: B256,
    pub address: Address,
    pub pool_type: String,
    pub swap_fee: BigDecimal,
    pub total_shares: BigDecimal,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub amp: Option<U256>,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
    pub balance: BigDecimal,
    #[serde(default)]
    pub weight: Option<BigDecimal>,
}

impl Pool {
    pub fn to_domain(&self) -> Result<pool::Pool, Error> {
        let id = pool::PoolId(self.id);
        let invalid = |reason: String| Error::InvalidPool { id, reason };

        if id.address() != self.address {
            return Err(invalid(format!("address {} does not match id", self.address)));
        }

        let kind = match self.pool_type.as_str() {
            "Weighted" | "LiquidityBootstrapping" => pool::PoolKind::Weighted {
                weights: self
                    .tokens
                    .iter()
                    .map(|token| {
                        let weight = token.weight.as_ref().ok_or_else(|| {
                            invalid(format!("missing weight for {}", token.address))
                        })?;
                        conv::decimal_to_raw(weight, 18)
                            .map(Bfp::from_wei)
                            .ok_or_else(|| invalid(format!("invalid weight {weight}")))
                    })
                    .collect::<Result<_, _>>()?,
            },
            "Stable" => {
                let amp = self
                    .amp
                    .ok_or_else(|| invalid("missing amplification".to_owned()))?;
                pool::PoolKind::Stable {
                    amplification: amp
                        .checked_mul(U256::from(1000))
                        .ok_or_else(|| invalid(format!("invalid amplification {amp}")))?,
                }
            }
            other => return Err(Error::UnsupportedPoolType(id, other.to_owned())),
        };

        let tokens = self
            .tokens
            .iter()
            .map(|token| {
                Ok(pool::Token {
                    address: token.address,
                    decimals: token.decimals,
                    balance: conv::decimal_to_raw(&token.balance, token.decimals).ok_or_else(
                        || {
                            invalid(format!(
                                "invalid balance {} for {}",
                                token.balance, token.address
                            ))
                        },
                    )?,
                })
            })
            .collect::<Result<_, Error>>()?;

        Ok(pool::Pool {
            id,
            kind,
            tokens,
            swap_fee: conv::decimal_to_raw(&self.swap_fee, 18)
                .map(Bfp::from_wei)
                .ok_or_else(|| invalid(format!("invalid swap fee {}", self.swap_fee)))?,
            total_shares: conv::decimal_to_raw(&self.total_shares, 18)
                .ok_or_else(|| invalid(format!("invalid total shares {}", self.total_shares)))?,
        })
    }
}
