use {
    crate::{
        domain::{
            eth::U256,
            pool::{
                PoolType,
                math::{self, Exit, MockPoolMath, Registry, SwapKind},
                source::{DataSourceError, MockPoolDataProvider},
            },
            vault::{Error, VaultModel},
        },
        tests::{self, A, B, C, ether},
    },
    anyhow::anyhow,
};

#[tokio::test]
async fn unknown_pool() {
    let err = tests::model(tests::pools())
        .multicall(
            &[tests::swap(tests::pool_id(0x99), SwapKind::GivenIn, (A, B), ether(1), None, None)],
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PoolNotFound(id) if id == tests::pool_id(0x99)));
}

#[tokio::test]
async fn batch_step_index_out_of_range() {
    let pools = tests::pools();
    let err = tests::model(pools.clone())
        .multicall(
            &[tests::batch_swap(
                SwapKind::GivenIn,
                &[(pools[0].id, 0, 5, ether(1))],
                &[A, B],
                &[],
                &[],
            )],
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 2 }));
}

#[tokio::test]
async fn token_not_in_pool() {
    let pools = tests::pools();
    let err = tests::model(pools.clone())
        .multicall(
            &[tests::swap(pools[0].id, SwapKind::GivenIn, (A, C), ether(1), None, None)],
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TokenNotInPool { token, .. } if token == C));
}

#[tokio::test]
async fn math_errors_name_the_pool() {
    let pools = tests::pools();
    let mut pool_math = MockPoolMath::new();
    pool_math
        .expect_swap()
        .returning(|_, _| Err(math::Error::MaxInRatio));
    let mut model = VaultModel::with_math(
        Box::new(tests::provider(pools.clone(), 1)),
        Registry::empty().with(PoolType::Weighted, pool_math),
    );

    let err = model
        .multicall(
            &[tests::swap(pools[1].id, SwapKind::GivenIn, (B, C), ether(1), None, None)],
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Math { pool_id, source: math::Error::MaxInRatio } if pool_id == pools[1].id
    ));
}

#[tokio::test]
async fn swap_above_max_in_ratio() {
    let pools = tests::pools();
    let err = tests::model(pools.clone())
        .multicall(
            &[tests::swap(pools[0].id, SwapKind::GivenIn, (A, B), ether(400), None, None)],
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Math { source: math::Error::MaxInRatio, .. }
    ));
}

#[tokio::test]
async fn unsupported_stable_exit_kind() {
    let pool = tests::stable(0x33, [(A, ether(1000)), (B, ether(1000))]);
    let err = tests::model(vec![pool.clone()])
        .multicall(
            &[tests::exit(
                &pool,
                Exit::BptInForExactTokensOut {
                    amounts_out: vec![ether(1), ether(1)],
                    max_bpt_in: U256::MAX,
                },
                &[],
            )],
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Math { source: math::Error::UnsupportedKind(PoolType::Stable, _), .. }
    ));
}

#[tokio::test]
async fn provider_failure_aborts_the_call() {
    let mut provider = MockPoolDataProvider::new();
    provider
        .expect_fetch_pools()
        .times(1)
        .returning(|| Err(anyhow!("subgraph unavailable")));

    let err = VaultModel::new(Box::new(provider))
        .multicall(&[], false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DataSource(DataSourceError::Provider(_))));
}

/// A failing step discards the deltas of the steps before it.
#[tokio::test]
async fn no_partial_results() {
    let pools = tests::pools();
    let result = tests::model(pools.clone())
        .multicall(
            &[
                tests::swap(pools[0].id, SwapKind::GivenIn, (A, B), ether(1), None, None),
                tests::swap(tests::pool_id(0x99), SwapKind::GivenIn, (A, B), ether(1), None, None),
            ],
            false,
        )
        .await;

    assert!(result.is_err());
}
