use {
    super::{join_outcome, quote},
    crate::{
        domain::{
            eth::{I256, U256},
            pool::math::{Join, SwapKind},
            vault::{Error, Request},
        },
        tests::{self, A, B, ether, signed},
    },
};

#[tokio::test]
async fn single_swap_minimum_out() {
    let pools = tests::pools();
    let ab = &pools[0];
    let out = quote(ab, SwapKind::GivenIn, A, B, ether(5));
    let mut model = tests::model(pools.clone());

    model
        .multicall(
            &[tests::swap(ab.id, SwapKind::GivenIn, (A, B), ether(5), Some(out), None)],
            false,
        )
        .await
        .unwrap();
    let err = model
        .multicall(
            &[tests::swap(
                ab.id,
                SwapKind::GivenIn,
                (A, B),
                ether(5),
                Some(out + U256::from(1)),
                None,
            )],
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::LimitExceeded { token, amount, .. } if token == B && amount == out
    ));
}

#[tokio::test]
async fn single_swap_maximum_in() {
    let pools = tests::pools();
    let ab = &pools[0];
    let amount_in = quote(ab, SwapKind::GivenOut, A, B, ether(5));

    let err = tests::model(pools.clone())
        .multicall(
            &[tests::swap(
                ab.id,
                SwapKind::GivenOut,
                (A, B),
                ether(5),
                Some(amount_in - U256::from(1)),
                None,
            )],
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::LimitExceeded { token, .. } if token == A));
}

/// Batch limits bound what the vault receives: positive for tokens paid in,
/// negative for a minimum amount paid out.
#[tokio::test]
async fn batch_swap_limits_use_vault_sign() {
    let pools = tests::pools();
    let ab = &pools[0];
    let out = quote(ab, SwapKind::GivenIn, A, B, ether(10));
    let batch = |limits: Vec<I256>| {
        tests::batch_swap(SwapKind::GivenIn, &[(ab.id, 0, 1, ether(10))], &[A, B], &limits, &[])
    };
    let mut model = tests::model(pools.clone());

    model
        .multicall(&[batch(vec![signed(ether(10)), -signed(out)])], false)
        .await
        .unwrap();

    let err = model
        .multicall(&[batch(vec![signed(ether(10)) - signed(U256::from(1)), -signed(out)])], false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LimitExceeded { token, .. } if token == A));

    let err = model
        .multicall(&[batch(vec![signed(ether(10)), -signed(out + U256::from(1))])], false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LimitExceeded { token, .. } if token == B));

    let err = model
        .multicall(&[batch(vec![signed(ether(10))])], false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedRequest(_)));
}

#[tokio::test]
async fn join_maximum_amounts_in() {
    let pools = tests::pools();
    let ab = &pools[0];
    let join = Join::AllTokensInForExactBptOut { bpt_out: ether(20) };
    let outcome = join_outcome(ab, &join);

    let mut request = tests::join(ab, join, None);
    let Request::Join(inner) = &mut request else {
        unreachable!()
    };
    inner.max_amounts_in = vec![outcome.amounts_in[0], outcome.amounts_in[1] - U256::from(1)];

    let err = tests::model(pools.clone())
        .multicall(&[request], false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::LimitExceeded { token, .. } if token == B));
}
