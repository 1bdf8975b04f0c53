//! Stable pool math, following Balancer V2 `StableMath.sol`. Invariant and
//! balance computations run on plain integers over upscaled balances.

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
        amplification,
        check_swap_tokens,
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
    },
    crate::domain::{eth::U256, pool::Pool},
};

const AMP_PRECISION: U256 = U256::from_limbs([1000, 0, 0, 0]);
const MAX_ITERATIONS: usize = 255;

fn add(a: U256, b: U256) -> Result<U256, Error> {
    a.checked_add(b).ok_or(Error::AddOverflow)
}

fn sub(a: U256, b: U256) -> Result<U256, Error> {
    a.checked_sub(b).ok_or(Error::SubOverflow)
}

fn mul(a: U256, b: U256) -> Result<U256, Error> {
    a.checked_mul(b).ok_or(Error::MulOverflow)
}

fn div_down(a: U256, b: U256) -> Result<U256, Error> {
    a.checked_div(b).ok_or(Error::ZeroDivision)
}

fn div_up(a: U256, b: U256) -> Result<U256, Error> {
    if b.is_zero() {
        return Err(Error::ZeroDivision);
    }
    if a.is_zero() {
        return Ok(U256::ZERO);
    }
    Ok((a - U256::from(1)) / b + U256::from(1))
}

fn raw(balances: &[Bfp]) -> Vec<U256> {
    balances.iter().map(|b| b.as_uint256()).collect()
}

/// Computes the StableSwap invariant `D` with Newton's method.
pub fn calculate_invariant(amplification: U256, balances: &[U256]) -> Result<U256, Error> {
    let sum = balances.iter().try_fold(U256::ZERO, |sum, b| add(sum, *b))?;
    if sum.is_zero() {
        return Ok(U256::ZERO);
    }
    let n = U256::from(balances.len());
    let amp_times_total = mul(amplification, n)?;

    let mut invariant = sum;
    for _ in 0..MAX_ITERATIONS {
        let mut d_p = invariant;
        for balance in balances {
            d_p = div_down(mul(d_p, invariant)?, mul(*balance, n)?)?;
        }
        let previous = invariant;
        let numerator = mul(
            add(
                div_down(mul(amp_times_total, sum)?, AMP_PRECISION)?,
                mul(d_p, n)?,
            )?,
            invariant,
        )?;
        let denominator = add(
            div_down(
                mul(sub(amp_times_total, AMP_PRECISION)?, invariant)?,
                AMP_PRECISION,
            )?,
            mul(n + U256::from(1), d_p)?,
        )?;
        invariant = div_down(numerator, denominator)?;
        if invariant.abs_diff(previous) <= U256::from(1) {
            return Ok(invariant);
        }
    }
    Err(Error::StableInvariantDidntConverge)
}

/// Solves the invariant for the balance of `token_index` given all other
/// balances.
pub fn get_token_balance_given_invariant_and_all_other_balances(
    amplification: U256,
    balances: &[U256],
    invariant: U256,
    token_index: usize,
) -> Result<U256, Error> {
    let n = U256::from(balances.len());
    let amp_times_total = mul(amplification, n)?;

    let mut sum = balances[0];
    let mut p_d = mul(balances[0], n)?;
    for balance in &balances[1..] {
        p_d = div_down(mul(mul(p_d, *balance)?, n)?, invariant)?;
        sum = add(sum, *balance)?;
    }
    sum = sub(sum, balances[token_index])?;

    let invariant_squared = mul(invariant, invariant)?;
    let c = mul(
        mul(
            div_up(invariant_squared, mul(amp_times_total, p_d)?)?,
            AMP_PRECISION,
        )?,
        balances[token_index],
    )?;
    let b = add(
        sum,
        mul(div_down(invariant, amp_times_total)?, AMP_PRECISION)?,
    )?;

    let mut token_balance = div_up(add(invariant_squared, c)?, add(invariant, b)?)?;
    for _ in 0..MAX_ITERATIONS {
        let previous = token_balance;
        token_balance = div_up(
            add(mul(token_balance, token_balance)?, c)?,
            sub(add(mul(token_balance, U256::from(2))?, b)?, invariant)?,
        )?;
        if token_balance.abs_diff(previous) <= U256::from(1) {
            return Ok(token_balance);
        }
    }
    Err(Error::StableGetBalanceDidntConverge)
}

pub fn calc_out_given_in(
    amplification: U256,
    balances: &[U256],
    token_index_in: usize,
    token_index_out: usize,
    amount_in: U256,
) -> Result<U256, Error> {
    let invariant = calculate_invariant(amplification, balances)?;
    let mut balances = balances.to_vec();
    balances[token_index_in] = add(balances[token_index_in], amount_in)?;
    let final_balance_out = get_token_balance_given_invariant_and_all_other_balances(
        amplification,
        &balances,
        invariant,
        token_index_out,
    )?;
    // Rounds in favour of the pool.
    sub(sub(balances[token_index_out], final_balance_out)?, U256::from(1))
}

pub fn calc_in_given_out(
    amplification: U256,
    balances: &[U256],
    token_index_in: usize,
    token_index_out: usize,
    amount_out: U256,
) -> Result<U256, Error> {
    let invariant = calculate_invariant(amplification, balances)?;
    let mut balances = balances.to_vec();
    balances[token_index_out] = sub(balances[token_index_out], amount_out)?;
    let final_balance_in = get_token_balance_given_invariant_and_all_other_balances(
        amplification,
        &balances,
        invariant,
        token_index_in,
    )?;
    add(sub(final_balance_in, balances[token_index_in])?, U256::from(1))
}

pub fn calc_bpt_out_given_exact_tokens_in(
    amplification: U256,
    balances: &[Bfp],
    amounts_in: &[Bfp],
    total_shares: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let sum = balances.iter().try_fold(Bfp::zero(), |sum, b| sum.add(*b))?;

    let mut balance_ratios_with_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_with_fees = Bfp::zero();
    for (balance, amount_in) in balances.iter().zip(amounts_in) {
        let current_weight = balance.div_down(sum)?;
        let ratio = balance.add(*amount_in)?.div_down(*balance)?;
        invariant_ratio_with_fees = invariant_ratio_with_fees.add(ratio.mul_down(current_weight)?)?;
        balance_ratios_with_fee.push(ratio);
    }

    let mut new_balances = Vec::with_capacity(balances.len());
    for (i, balance) in balances.iter().enumerate() {
        let amount_in_without_fee = if balance_ratios_with_fee[i] > invariant_ratio_with_fees {
            let non_taxable = balance.mul_down(invariant_ratio_with_fees.sub(Bfp::one())?)?;
            let taxable = amounts_in[i].sub(non_taxable)?;
            non_taxable.add(taxable.mul_down(swap_fee.complement())?)?
        } else {
            amounts_in[i]
        };
        new_balances.push(balance.add(amount_in_without_fee)?.as_uint256());
    }

    let current_invariant = calculate_invariant(amplification, &raw(balances))?;
    let new_invariant = calculate_invariant(amplification, &new_balances)?;
    let invariant_ratio = Bfp::from_wei(new_invariant).div_down(Bfp::from_wei(current_invariant))?;
    if invariant_ratio > Bfp::one() {
        total_shares.mul_down(invariant_ratio.sub(Bfp::one())?)
    } else {
        Ok(Bfp::zero())
    }
}

pub fn calc_token_out_given_exact_bpt_in(
    amplification: U256,
    balances: &[Bfp],
    token_index: usize,
    bpt_in: Bfp,
    total_shares: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let raw_balances = raw(balances);
    let current_invariant = Bfp::from_wei(calculate_invariant(amplification, &raw_balances)?);
    let new_invariant = total_shares
        .sub(bpt_in)?
        .div_up(total_shares)?
        .mul_up(current_invariant)?;
    let new_balance = Bfp::from_wei(get_token_balance_given_invariant_and_all_other_balances(
        amplification,
        &raw_balances,
        new_invariant.as_uint256(),
        token_index,
    )?);
    let amount_out_without_fee = balances[token_index].sub(new_balance)?;

    let sum = balances.iter().try_fold(Bfp::zero(), |sum, b| sum.add(*b))?;
    let current_weight = balances[token_index].div_down(sum)?;
    let taxable = amount_out_without_fee.mul_up(current_weight.complement())?;
    let non_taxable = amount_out_without_fee.sub(taxable)?;
    non_taxable.add(taxable.mul_down(swap_fee.complement())?)
}

/// [`PoolMath`] for stable pools.
pub struct StableMath;

impl PoolMath for StableMath {
    fn swap(&self, pool: &Pool, swap: &Swap) -> Result<U256, Error> {
        let amplification = amplification(pool)?;
        check_swap_tokens(pool, swap)?;
        let balances = raw(&upscaled_balances(pool)?);
        let (token_in, token_out) = (&pool.tokens[swap.token_in], &pool.tokens[swap.token_out]);

        match swap.kind {
            SwapKind::GivenIn => {
                let amount_in =
                    subtract_swap_fee_amount(upscale(token_in, swap.amount)?, pool.swap_fee)?;
                let amount_out = calc_out_given_in(
                    amplification,
                    &balances,
                    swap.token_in,
                    swap.token_out,
                    amount_in.as_uint256(),
                )?;
                downscale_down(token_out, Bfp::from_wei(amount_out))
            }
            SwapKind::GivenOut => {
                let amount_out = upscale(token_out, swap.amount)?;
                let amount_in = calc_in_given_out(
                    amplification,
                    &balances,
                    swap.token_in,
                    swap.token_out,
                    amount_out.as_uint256(),
                )?;
                downscale_up(
                    token_in,
                    add_swap_fee_amount(Bfp::from_wei(amount_in), pool.swap_fee)?,
                )
            }
        }
    }

    fn join(&self, pool: &Pool, join: &Join) -> Result<JoinOutcome, Error> {
        let amplification = amplification(pool)?;
        let balances = upscaled_balances(pool)?;
        let total_shares = Bfp::from_wei(pool.total_shares);

        match join {
            Join::ExactTokensInForBptOut {
                amounts_in,
                min_bpt_out,
            } => {
                let upscaled = upscale_amounts(pool, amounts_in)?;
                let bpt_out = calc_bpt_out_given_exact_tokens_in(
                    amplification,
                    &balances,
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
            Join::AllTokensInForExactBptOut { bpt_out } => {
                let amounts_in =
                    proportional_amounts_in(&balances, total_shares, Bfp::from_wei(*bpt_out))?;
                Ok(JoinOutcome {
                    bpt_out: *bpt_out,
                    amounts_in: downscale_amounts(pool, amounts_in, downscale_up)?,
                })
            }
            Join::Init { .. } | Join::TokenInForExactBptOut { .. } => {
                Err(Error::UnsupportedKind(pool.pool_type(), join.name()))
            }
        }
    }

    fn exit(&self, pool: &Pool, exit: &Exit) -> Result<ExitOutcome, Error> {
        let amplification = amplification(pool)?;
        let balances = upscaled_balances(pool)?;
        let total_shares = Bfp::from_wei(pool.total_shares);

        match exit {
            Exit::ExactBptInForOneTokenOut {
                bpt_in,
                token_index,
            } => {
                let token = token(pool, *token_index)?;
                let amount_out = calc_token_out_given_exact_bpt_in(
                    amplification,
                    &balances,
                    *token_index,
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
            Exit::BptInForExactTokensOut { .. } => {
                Err(Error::UnsupportedKind(pool.pool_type(), exit.name()))
            }
        }
    }
}
