use {
    super::quote,
    crate::{
        domain::{
            eth::{I256, U256},
            pool::math::SwapKind,
        },
        tests::{self, A, B, C, ether, signed},
    },
};

#[tokio::test]
async fn single_swap_given_in() {
    let pools = tests::pools();
    let ab = &pools[0];
    let out = quote(ab, SwapKind::GivenIn, A, B, ether(5));

    let deltas = tests::model(pools.clone())
        .multicall(&[tests::swap(ab.id, SwapKind::GivenIn, (A, B), ether(5), None, None)], false)
        .await
        .unwrap();

    assert_eq!(deltas.get(&A), -signed(ether(5)));
    assert_eq!(deltas.get(&B), signed(out));
    // Fees and curvature make the user receive less than they paid.
    assert!(out < ether(5));
}

#[tokio::test]
async fn single_swap_given_out() {
    let pools = tests::pools();
    let ab = &pools[0];
    let amount_in = quote(ab, SwapKind::GivenOut, A, B, ether(5));

    let deltas = tests::model(pools.clone())
        .multicall(&[tests::swap(ab.id, SwapKind::GivenOut, (A, B), ether(5), None, None)], false)
        .await
        .unwrap();

    assert_eq!(deltas.get(&A), -signed(amount_in));
    assert_eq!(deltas.get(&B), signed(ether(5)));
    assert!(amount_in > ether(5));
}

#[tokio::test]
async fn stable_swap_is_close_to_parity() {
    let pool = tests::stable(0x33, [(A, ether(1_000_000)), (B, ether(1_000_000))]);

    let deltas = tests::model(vec![pool.clone()])
        .multicall(&[tests::swap(pool.id, SwapKind::GivenIn, (A, B), ether(1), None, None)], false)
        .await
        .unwrap();

    let out = deltas.get(&B);
    assert!(out < signed(ether(1)));
    assert!(out > signed(ether(1) * U256::from(999) / U256::from(1000)));
    assert_eq!(deltas.get(&A), -signed(ether(1)));
}

#[tokio::test]
async fn batch_swap_accumulates_per_asset() {
    let pools = tests::pools();
    let (ab, bc) = (&pools[0], &pools[1]);
    let b_out = quote(ab, SwapKind::GivenIn, A, B, ether(10));
    let c_out = quote(bc, SwapKind::GivenIn, B, C, ether(4));

    let deltas = tests::model(pools.clone())
        .multicall(
            &[tests::batch_swap(
                SwapKind::GivenIn,
                &[(ab.id, 0, 1, ether(10)), (bc.id, 1, 2, ether(4))],
                &[A, B, C],
                &[],
                &[],
            )],
            false,
        )
        .await
        .unwrap();

    assert_eq!(deltas.get(&A), -signed(ether(10)));
    assert_eq!(deltas.get(&B), signed(b_out) - signed(ether(4)));
    assert_eq!(deltas.get(&C), signed(c_out));
}

#[tokio::test]
async fn untouched_assets_are_reported_as_zero() {
    let pools = tests::pools();
    let ab = &pools[0];

    let deltas = tests::model(pools.clone())
        .multicall(
            &[tests::batch_swap(
                SwapKind::GivenIn,
                &[(ab.id, 0, 1, ether(1))],
                &[A, B, C],
                &[],
                &[],
            )],
            false,
        )
        .await
        .unwrap();

    assert_eq!(
        deltas.iter().find(|(token, _)| **token == C).map(|(_, delta)| *delta),
        Some(I256::ZERO)
    );
}

#[tokio::test]
async fn zero_amount_step_is_a_no_op() {
    let pools = tests::pools();
    let (ab, bc) = (&pools[0], &pools[1]);
    let b_out = quote(ab, SwapKind::GivenIn, A, B, ether(2));

    let deltas = tests::model(pools.clone())
        .multicall(
            &[tests::batch_swap(
                SwapKind::GivenIn,
                &[(ab.id, 0, 1, ether(2)), (bc.id, 1, 2, U256::ZERO)],
                &[A, B, C],
                &[],
                &[],
            )],
            false,
        )
        .await
        .unwrap();

    assert_eq!(deltas.get(&A), -signed(ether(2)));
    assert_eq!(deltas.get(&B), signed(b_out));
    assert_eq!(deltas.get(&C), I256::ZERO);
}

#[tokio::test]
async fn batch_swap_given_out() {
    let pools = tests::pools();
    let ab = &pools[0];
    let amount_in = quote(ab, SwapKind::GivenOut, B, A, ether(7));

    let deltas = tests::model(pools.clone())
        .multicall(
            &[tests::batch_swap(SwapKind::GivenOut, &[(ab.id, 1, 0, ether(7))], &[A, B], &[], &[])],
            false,
        )
        .await
        .unwrap();

    assert_eq!(deltas.get(&A), signed(ether(7)));
    assert_eq!(deltas.get(&B), -signed(amount_in));
}
