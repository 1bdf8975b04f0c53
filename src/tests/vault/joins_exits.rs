use {
    super::{join_outcome, quote},
    crate::{
        domain::{
            eth::{I256, U256},
            pool::math::{Exit, Join, SwapKind},
            vault::OutputReference,
        },
        tests::{self, A, B, ether, signed},
    },
};

fn exact_tokens_in(amount: U256) -> Join {
    Join::ExactTokensInForBptOut {
        amounts_in: vec![amount, amount],
        min_bpt_out: U256::ZERO,
    }
}

#[tokio::test]
async fn join_pays_tokens_and_receives_bpt() {
    let pools = tests::pools();
    let ab = &pools[0];
    let outcome = join_outcome(ab, &exact_tokens_in(ether(10)));

    let deltas = tests::model(pools.clone())
        .multicall(&[tests::join(ab, exact_tokens_in(ether(10)), None)], false)
        .await
        .unwrap();

    assert_eq!(deltas.get(&A), -signed(ether(10)));
    assert_eq!(deltas.get(&B), -signed(ether(10)));
    assert_eq!(deltas.get(&ab.address()), signed(outcome.bpt_out));
    // A proportional 1% join mints about 1% of the supply.
    assert!(outcome.bpt_out <= ether(20));
    assert!(outcome.bpt_out > ether(20) - U256::from(1_000_000_000_u64));
}

#[tokio::test]
async fn repeated_joins_accumulate() {
    let pools = tests::pools();
    let ab = &pools[0];
    let outcome = join_outcome(ab, &exact_tokens_in(ether(10)));

    let deltas = tests::model(pools.clone())
        .multicall(
            &[
                tests::join(ab, exact_tokens_in(ether(10)), None),
                tests::join(ab, exact_tokens_in(ether(10)), None),
            ],
            false,
        )
        .await
        .unwrap();

    assert_eq!(deltas.get(&A), -signed(ether(20)));
    assert_eq!(deltas.get(&B), -signed(ether(20)));
    assert_eq!(
        deltas.get(&ab.address()),
        signed(outcome.bpt_out) + signed(outcome.bpt_out)
    );
}

/// Exiting with all BPT minted by a join returns no more than was paid in.
#[tokio::test]
async fn join_then_exit_conserves_tokens() {
    let pools = tests::pools();
    let ab = &pools[0];
    let bpt = OutputReference::chained(1);

    let deltas = tests::model(pools.clone())
        .multicall(
            &[
                tests::join(ab, exact_tokens_in(ether(10)), Some(bpt)),
                tests::exit(ab, Exit::ExactBptInForTokensOut { bpt_in: bpt.0 }, &[]),
            ],
            false,
        )
        .await
        .unwrap();

    assert_eq!(deltas.get(&ab.address()), I256::ZERO);
    for token in [A, B] {
        let delta = deltas.get(&token);
        assert!(delta <= I256::ZERO);
        assert!(delta > -signed(U256::from(1_000_000_000_u64)));
    }
}

#[tokio::test]
async fn join_amounts_resolve_references() {
    let pools = tests::pools();
    let ab = &pools[0];
    let reference = OutputReference::chained(3);
    let b_out = quote(ab, SwapKind::GivenIn, A, B, ether(1));
    let outcome = join_outcome(
        ab,
        &Join::ExactTokensInForBptOut {
            amounts_in: vec![U256::ZERO, b_out],
            min_bpt_out: U256::ZERO,
        },
    );

    let deltas = tests::model(pools.clone())
        .multicall(
            &[
                tests::swap(ab.id, SwapKind::GivenIn, (A, B), ether(1), None, Some(reference)),
                tests::join(
                    ab,
                    Join::ExactTokensInForBptOut {
                        amounts_in: vec![U256::ZERO, reference.0],
                        min_bpt_out: U256::ZERO,
                    },
                    None,
                ),
            ],
            false,
        )
        .await
        .unwrap();

    assert_eq!(deltas.get(&A), -signed(ether(1)));
    assert_eq!(deltas.get(&B), I256::ZERO);
    assert_eq!(deltas.get(&ab.address()), signed(outcome.bpt_out));
}

#[tokio::test]
async fn single_token_exit_writes_references() {
    let pools = tests::pools();
    let (ab, bc) = (&pools[0], &pools[1]);
    let b_ref = OutputReference::chained(4);

    let deltas = tests::model(pools.clone())
        .multicall(
            &[
                tests::exit(
                    ab,
                    Exit::ExactBptInForOneTokenOut {
                        bpt_in: ether(1),
                        token_index: 1,
                    },
                    &[(1, b_ref)],
                ),
                tests::swap(bc.id, SwapKind::GivenIn, (B, tests::C), b_ref.0, None, None),
            ],
            false,
        )
        .await
        .unwrap();

    assert_eq!(deltas.get(&ab.address()), -signed(ether(1)));
    assert_eq!(deltas.get(&A), I256::ZERO);
    // Everything received from the exit went into the swap.
    assert_eq!(deltas.get(&B), I256::ZERO);
    assert!(deltas.get(&tests::C) > I256::ZERO);
}
