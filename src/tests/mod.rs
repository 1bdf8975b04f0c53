//! Scenario tests running whole multicalls against fixture pools.

use crate::domain::{
    eth::{Address, B256, Bytes, I256, U256},
    pool::{
        self,
        Pool,
        PoolId,
        math::{Exit, Join, SwapKind, fixed_point::Bfp},
        source::MockPoolDataProvider,
    },
    vault::{
        OutputReference,
        Request,
        VaultModel,
        request::{
            BatchSwapRequest,
            BatchSwapStep,
            ExitRequest,
            Funds,
            JoinRequest,
            OutputReferenceIndex,
            SingleSwap,
            SwapRequest,
        },
        user_data,
    },
};

mod subgraph;

pub const A: Address = alloy::primitives::address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
pub const B: Address = alloy::primitives::address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
pub const C: Address = alloy::primitives::address!("cccccccccccccccccccccccccccccccccccccccc");
pub const USER: Address = alloy::primitives::address!("9008d19f58aabd9ed0d60971565aa8510560ab41");

/// `n` whole tokens with 18 decimals.
pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10).pow(U256::from(18))
}

pub fn signed(amount: U256) -> I256 {
    I256::try_from(amount).unwrap()
}

pub fn pool_id(byte: u8) -> PoolId {
    PoolId(B256::repeat_byte(byte))
}

/// A 50/50 weighted pool with a 0.3% swap fee.
pub fn weighted(id: u8, tokens: [(Address, U256); 2]) -> Pool {
    Pool {
        id: pool_id(id),
        kind: pool::PoolKind::Weighted {
            weights: vec![Bfp::from_wei(ether(1) / U256::from(2)); 2],
        },
        tokens: tokens
            .into_iter()
            .map(|(address, balance)| pool::Token {
                address,
                decimals: 18,
                balance,
            })
            .collect(),
        swap_fee: Bfp::from_wei(U256::from(3_000_000_000_000_000_u64)),
        total_shares: ether(2000),
    }
}

/// A two token stable pool with `A = 200` and a 0.04% swap fee.
pub fn stable(id: u8, tokens: [(Address, U256); 2]) -> Pool {
    Pool {
        id: pool_id(id),
        kind: pool::PoolKind::Stable {
            amplification: U256::from(200_000),
        },
        tokens: tokens
            .into_iter()
            .map(|(address, balance)| pool::Token {
                address,
                decimals: 18,
                balance,
            })
            .collect(),
        swap_fee: Bfp::from_wei(U256::from(400_000_000_000_000_u64)),
        total_shares: ether(2_000_000),
    }
}

/// The A/B and B/C weighted pools most scenarios run against.
pub fn pools() -> Vec<Pool> {
    vec![
        weighted(0x11, [(A, ether(1000)), (B, ether(1000))]),
        weighted(0x22, [(B, ether(1000)), (C, ether(2000))]),
    ]
}

/// A provider serving `pools`, expecting exactly `times` fetches.
pub fn provider(pools: Vec<Pool>, times: usize) -> MockPoolDataProvider {
    let mut provider = MockPoolDataProvider::new();
    provider
        .expect_fetch_pools()
        .times(times)
        .returning(move || Ok(pools.clone()));
    provider
}

/// A vault model whose pools are fetched once.
pub fn model(pools: Vec<Pool>) -> VaultModel {
    VaultModel::new(Box::new(provider(pools, 1)))
}

fn funds() -> Funds {
    Funds {
        sender: USER,
        recipient: USER,
        ..Default::default()
    }
}

pub fn swap(
    pool: PoolId,
    kind: SwapKind,
    (asset_in, asset_out): (Address, Address),
    amount: U256,
    limit: Option<U256>,
    output_reference: Option<OutputReference>,
) -> Request {
    Request::Swap(SwapRequest {
        single_swap: SingleSwap {
            pool_id: pool,
            kind,
            asset_in,
            asset_out,
            amount,
            user_data: Bytes::new(),
        },
        funds: funds(),
        limit,
        output_reference,
    })
}

/// A batch swap with steps `(pool, asset in index, asset out index, amount)`.
pub fn batch_swap(
    kind: SwapKind,
    steps: &[(PoolId, usize, usize, U256)],
    assets: &[Address],
    limits: &[I256],
    output_references: &[(usize, OutputReference)],
) -> Request {
    Request::BatchSwap(BatchSwapRequest {
        kind,
        swaps: steps
            .iter()
            .map(|&(pool_id, asset_in_index, asset_out_index, amount)| BatchSwapStep {
                pool_id,
                asset_in_index,
                asset_out_index,
                amount,
                user_data: Bytes::new(),
            })
            .collect(),
        assets: assets.to_vec(),
        funds: funds(),
        limits: limits.to_vec(),
        output_references: output_references
            .iter()
            .map(|&(index, key)| OutputReferenceIndex { index, key })
            .collect(),
    })
}

pub fn join(pool: &Pool, join: Join, output_reference: Option<OutputReference>) -> Request {
    Request::Join(JoinRequest {
        pool_id: pool.id,
        sender: USER,
        recipient: USER,
        assets: pool.token_addresses().collect(),
        max_amounts_in: vec![],
        user_data: user_data::encode_join(&join),
        from_internal_balance: false,
        output_reference,
    })
}

pub fn exit(pool: &Pool, exit: Exit, output_references: &[(usize, OutputReference)]) -> Request {
    Request::Exit(ExitRequest {
        pool_id: pool.id,
        sender: USER,
        recipient: USER,
        assets: pool.token_addresses().collect(),
        min_amounts_out: vec![],
        user_data: user_data::encode_exit(&exit),
        to_internal_balance: false,
        output_references: output_references
            .iter()
            .map(|&(index, key)| OutputReferenceIndex { index, key })
            .collect(),
    })
}
