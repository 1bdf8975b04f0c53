//! Weighted pool math, following Balancer V2 `WeightedMath.sol`.

use {
    super::{
        Error,
        Exit,
        ExitOutcome,
        Join,
        JoinOutcome,
        PoolMath,
        Swap,
        SwapKind,
        add_swap_fee_amount,
        downscale_amounts,
        downscale_down,
        downscale_up,
        fixed_point::Bfp,
        proportional_amounts_in,
        proportional_amounts_out,
        subtract_swap_fee_amount,
        token,
        upscale,
        upscale_amounts,
        upscaled_balances,
        weights,
    },
    crate::domain::{eth::U256, pool::Pool},
};

// Swap limits: amounts in and out cannot exceed 30% of the current balance.
const MAX_IN_RATIO: Bfp = Bfp::from_wei(U256::from_limbs([300_000_000_000_000_000, 0, 0, 0]));
const MAX_OUT_RATIO: Bfp = Bfp::from_wei(U256::from_limbs([300_000_000_000_000_000, 0, 0, 0]));

// Single token joins and exits cannot move the invariant beyond these ratios.
const MAX_INVARIANT_RATIO: Bfp =
    Bfp::from_wei(U256::from_limbs([3_000_000_000_000_000_000, 0, 0, 0]));
const MIN_INVARIANT_RATIO: Bfp =
    Bfp::from_wei(U256::from_limbs([700_000_000_000_000_000, 0, 0, 0]));

pub fn calc_out_given_in(
    balance_in: Bfp,
    weight_in: Bfp,
    balance_out: Bfp,
    weight_out: Bfp,
    amount_in: Bfp,
) -> Result<Bfp, Error> {
    if amount_in > balance_in.mul_down(MAX_IN_RATIO)? {
        return Err(Error::MaxInRatio);
    }
    let denominator = balance_in.add(amount_in)?;
    let base = balance_in.div_up(denominator)?;
    let exponent = weight_in.div_down(weight_out)?;
    let power = base.pow_up(exponent)?;
    balance_out.mul_down(power.complement())
}

pub fn calc_in_given_out(
    balance_in: Bfp,
    weight_in: Bfp,
    balance_out: Bfp,
    weight_out: Bfp,
    amount_out: Bfp,
) -> Result<Bfp, Error> {
    if amount_out > balance_out.mul_down(MAX_OUT_RATIO)? {
        return Err(Error::MaxOutRatio);
    }
    let base = balance_out.div_up(balance_out.sub(amount_out)?)?;
    let exponent = weight_out.div_up(weight_in)?;
    let power = base.pow_up(exponent)?;
    let ratio = power.sub(Bfp::one())?;
    balance_in.mul_up(ratio)
}

pub fn calc_bpt_out_given_exact_tokens_in(
    balances: &[Bfp],
    weights: &[Bfp],
    amounts_in: &[Bfp],
    total_shares: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let mut balance_ratios_with_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_with_fees = Bfp::zero();
    for ((balance, weight), amount_in) in balances.iter().zip(weights).zip(amounts_in) {
        let ratio = balance.add(*amount_in)?.div_down(*balance)?;
        invariant_ratio_with_fees = invariant_ratio_with_fees.add(ratio.mul_down(*weight)?)?;
        balance_ratios_with_fee.push(ratio);
    }

    let mut invariant_ratio = Bfp::one();
    for (i, balance) in balances.iter().enumerate() {
        // Only the part of the amount in that exceeds a proportional join is
        // charged the swap fee.
        let amount_in_without_fee = if balance_ratios_with_fee[i] > invariant_ratio_with_fees {
            let non_taxable = balance.mul_down(invariant_ratio_with_fees.sub(Bfp::one())?)?;
            let taxable = amounts_in[i].sub(non_taxable)?;
            non_taxable.add(taxable.mul_down(swap_fee.complement())?)?
        } else {
            amounts_in[i]
        };
        let balance_ratio = balance.add(amount_in_without_fee)?.div_down(*balance)?;
        invariant_ratio = invariant_ratio.mul_down(balance_ratio.pow_down(weights[i])?)?;
    }

    if invariant_ratio > Bfp::one() {
        total_shares.mul_down(invariant_ratio.sub(Bfp::one())?)
    } else {
        Ok(Bfp::zero())
    }
}

pub fn calc_token_in_given_exact_bpt_out(
    balance: Bfp,
    weight: Bfp,
    bpt_out: Bfp,
    total_shares: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let invariant_ratio = total_shares.add(bpt_out)?.div_up(total_shares)?;
    if invariant_ratio > MAX_INVARIANT_RATIO {
        return Err(Error::MaxOutBptForTokenIn);
    }
    let balance_ratio = invariant_ratio.pow_up(Bfp::one().div_up(weight)?)?;
    let amount_in_without_fee = balance.mul_up(balance_ratio.sub(Bfp::one())?)?;

    let taxable = amount_in_without_fee.mul_up(weight.complement())?;
    let non_taxable = amount_in_without_fee.sub(taxable)?;
    non_taxable.add(taxable.div_up(swap_fee.complement())?)
}

pub fn calc_bpt_in_given_exact_tokens_out(
    balances: &[Bfp],
    weights: &[Bfp],
    amounts_out: &[Bfp],
    total_shares: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let mut balance_ratios_without_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_without_fees = Bfp::zero();
    for ((balance, weight), amount_out) in balances.iter().zip(weights).zip(amounts_out) {
        let ratio = balance.sub(*amount_out)?.div_up(*balance)?;
        invariant_ratio_without_fees =
            invariant_ratio_without_fees.add(ratio.mul_up(*weight)?)?;
        balance_ratios_without_fee.push(ratio);
    }

    let mut invariant_ratio = Bfp::one();
    for (i, balance) in balances.iter().enumerate() {
        let amount_out_with_fee = if invariant_ratio_without_fees > balance_ratios_without_fee[i] {
            let non_taxable = balance.mul_down(invariant_ratio_without_fees.complement())?;
            let taxable = amounts_out[i].sub(non_taxable)?;
            non_taxable.add(taxable.div_up(swap_fee.complement())?)?
        } else {
            amounts_out[i]
        };
        let balance_ratio = balance.sub(amount_out_with_fee)?.div_down(*balance)?;
        invariant_ratio = invariant_ratio.mul_down(balance_ratio.pow_down(weights[i])?)?;
    }

    total_shares.mul_up(invariant_ratio.complement())
}

pub fn calc_token_out_given_exact_bpt_in(
    balance: Bfp,
    weight: Bfp,
    bpt_in: Bfp,
    total_shares: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let invariant_ratio = total_shares.sub(bpt_in)?.div_up(total_shares)?;
    if invariant_ratio < MIN_INVARIANT_RATIO {
        return Err(Error::MinBptInForTokenOut);
    }
    let balance_ratio = invariant_ratio.pow_up(Bfp::one().div_down(weight)?)?;
    let amount_out_without_fee = balance.mul_down(balance_ratio.complement())?;

    let taxable = amount_out_without_fee.mul_up(weight.complement())?;
    let non_taxable = amount_out_without_fee.sub(taxable)?;
    non_taxable.add(taxable.mul_down(swap_fee.complement())?)
}

/// [`PoolMath`] for weighted and liquidity bootstrapping pools.
pub struct WeightedMath;

impl PoolMath for WeightedMath {
    fn swap(&self, pool: &Pool, swap: &Swap) -> Result<U256, Error> {
        let weights = weights(pool)?;
        let (token_in, token_out) = (token(pool, swap.token_in)?, token(pool, swap.token_out)?);
        let balance_in = upscale(token_in, token_in.balance)?;
        let balance_out = upscale(token_out, token_out.balance)?;
        let (weight_in, weight_out) = (weights[swap.token_in], weights[swap.token_out]);

        match swap.kind {
            SwapKind::GivenIn => {
                let amount_in =
                    subtract_swap_fee_amount(upscale(token_in, swap.amount)?, pool.swap_fee)?;
                let amount_out =
                    calc_out_given_in(balance_in, weight_in, balance_out, weight_out, amount_in)?;
                downscale_down(token_out, amount_out)
            }
            SwapKind::GivenOut => {
                let amount_out = upscale(token_out, swap.amount)?;
                let amount_in =
                    calc_in_given_out(balance_in, weight_in, balance_out, weight_out, amount_out)?;
                downscale_up(token_in, add_swap_fee_amount(amount_in, pool.swap_fee)?)
            }
        }
    }

    fn join(&self, pool: &Pool, join: &Join) -> Result<JoinOutcome, Error> {
        let weights = weights(pool)?;
        let balances = upscaled_balances(pool)?;
        let total_shares = Bfp::from_wei(pool.total_shares);

        match join {
            Join::Init { .. } => Err(Error::UnsupportedKind(pool.pool_type(), join.name())),
            Join::ExactTokensInForBptOut {
                amounts_in,
                min_bpt_out,
            } => {
                let upscaled = upscale_amounts(pool, amounts_in)?;
                let bpt_out = calc_bpt_out_given_exact_tokens_in(
                    &balances,
                    weights,
                    &upscaled,
                    total_shares,
                    pool.swap_fee,
                )?
                .as_uint256();
                if bpt_out < *min_bpt_out {
                    return Err(Error::BptOutMinAmount);
                }
                Ok(JoinOutcome {
                    bpt_out,
                    amounts_in: amounts_in.clone(),
                })
            }
            Join::TokenInForExactBptOut {
                bpt_out,
                token_index,
            } => {
                let token = token(pool, *token_index)?;
                let amount_in = calc_token_in_given_exact_bpt_out(
                    balances[*token_index],
                    weights[*token_index],
                    Bfp::from_wei(*bpt_out),
                    total_shares,
                    pool.swap_fee,
                )?;
                let mut amounts_in = vec![U256::ZERO; pool.tokens.len()];
                amounts_in[*token_index] = downscale_up(token, amount_in)?;
                Ok(JoinOutcome {
                    bpt_out: *bpt_out,
                    amounts_in,
                })
            }
            Join::AllTokensInForExactBptOut { bpt_out } => {
                let amounts_in =
                    proportional_amounts_in(&balances, total_shares, Bfp::from_wei(*bpt_out))?;
                Ok(JoinOutcome {
                    bpt_out: *bpt_out,
                    amounts_in: downscale_amounts(pool, amounts_in, downscale_up)?,
                })
            }
        }
    }

    fn exit(&self, pool: &Pool, exit: &Exit) -> Result<ExitOutcome, Error> {
        let weights = weights(pool)?;
        let balances = upscaled_balances(pool)?;
        let total_shares = Bfp::from_wei(pool.total_shares);

        match exit {
            Exit::ExactBptInForOneTokenOut {
                bpt_in,
                token_index,
            } => {
                let token = token(pool, *token_index)?;
                let amount_out = calc_token_out_given_exact_bpt_in(
                    balances[*token_index],
                    weights[*token_index],
                    Bfp::from_wei(*bpt_in),
                    total_shares,
                    pool.swap_fee,
                )?;
                let mut amounts_out = vec![U256::ZERO; pool.tokens.len()];
                amounts_out[*token_index] = downscale_down(token, amount_out)?;
                Ok(ExitOutcome {
                    bpt_in: *bpt_in,
                    amounts_out,
                })
            }
            Exit::ExactBptInForTokensOut { bpt_in } => {
                let amounts_out =
                    proportional_amounts_out(&balances, total_shares, Bfp::from_wei(*bpt_in))?;
                Ok(ExitOutcome {
                    bpt_in: *bpt_in,
                    amounts_out: downscale_amounts(pool, amounts_out, downscale_down)?,
                })
            }
            Exit::BptInForExactTokensOut {
                amounts_out,
                max_bpt_in,
            } => {
                let upscaled = upscale_amounts(pool, amounts_out)?;
                let bpt_in = calc_bpt_in_given_exact_tokens_out(
                    &balances,
                    weights,
                    &upscaled,
                    total_shares,
                    pool.swap_fee,
                )?
                .as_uint256();
                if bpt_in > *max_bpt_in {
                    return Err(Error::BptInMaxAmount);
                }
                Ok(ExitOutcome {
                    bpt_in,
                    amounts_out: amounts_out.clone(),
                })
            }
        }
    }
}
