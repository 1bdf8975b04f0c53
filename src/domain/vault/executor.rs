//! Applies single requests against the pool dictionary and the relayer
//! ledger. Every operation returns parallel token and amount sequences using
//! the [`Deltas`](super::Deltas) sign convention.

use {
    super::{
        Error,
        relayer::Relayer,
        request::{BatchSwapRequest, ExitRequest, JoinRequest, OutputReferenceIndex, SwapRequest},
        user_data,
    },
    crate::{
        domain::{
            eth::{Address, I256, U256},
            pool::{
                Pool,
                PoolId,
                Pools,
                math::{self, Registry, Swap, SwapKind},
            },
        },
        util::conv,
    },
};

pub type Step = (Vec<Address>, Vec<I256>);

/// Executes the requests of one multicall, in order.
pub struct Executor<'a> {
    relayer: Relayer,
    math: &'a Registry,
}

impl<'a> Executor<'a> {
    pub fn new(math: &'a Registry) -> Self {
        Self {
            relayer: Relayer::default(),
            math,
        }
    }

    pub fn do_join(&mut self, request: &JoinRequest, pools: &Pools) -> Result<Step, Error> {
        let pool = lookup(pools, &request.pool_id)?;
        check_assets(pool, &request.assets)?;

        let join = user_data::decode_join(&request.user_data)?
            .try_map_amounts(|amount| self.relayer.resolve(amount))?;
        let outcome = self
            .math
            .get(pool.pool_type())
            .and_then(|math| math.join(pool, &join))
            .map_err(|err| Error::math(pool.id, err))?;

        check_limits(
            &request.assets,
            &request.max_amounts_in,
            &outcome.amounts_in,
            |amount, limit| amount <= limit,
        )?;
        if let Some(reference) = request.output_reference {
            self.relayer.write(reference, outcome.bpt_out)?;
        }

        let mut tokens = request.assets.clone();
        tokens.push(pool.address());
        let mut amounts = outcome
            .amounts_in
            .iter()
            .map(|amount| negative(*amount))
            .collect::<Result<Vec<_>, _>>()?;
        amounts.push(positive(outcome.bpt_out)?);
        Ok((tokens, amounts))
    }

    pub fn do_exit(&mut self, request: &ExitRequest, pools: &Pools) -> Result<Step, Error> {
        let pool = lookup(pools, &request.pool_id)?;
        check_assets(pool, &request.assets)?;

        let exit = user_data::decode_exit(&request.user_data)?
            .try_map_amounts(|amount| self.relayer.resolve(amount))?;
        let outcome = self
            .math
            .get(pool.pool_type())
            .and_then(|math| math.exit(pool, &exit))
            .map_err(|err| Error::math(pool.id, err))?;

        check_limits(
            &request.assets,
            &request.min_amounts_out,
            &outcome.amounts_out,
            |amount, limit| amount >= limit,
        )?;
        self.write_references(&request.output_references, &outcome.amounts_out)?;

        let mut tokens = request.assets.clone();
        tokens.push(pool.address());
        let mut amounts = outcome
            .amounts_out
            .iter()
            .map(|amount| positive(*amount))
            .collect::<Result<Vec<_>, _>>()?;
        amounts.push(negative(outcome.bpt_in)?);
        Ok((tokens, amounts))
    }

    /// Returns exactly `[asset_out, asset_in]` with the amount received and
    /// the amount paid.
    pub fn do_single_swap(&mut self, request: &SwapRequest, pools: &Pools) -> Result<Step, Error> {
        let swap = &request.single_swap;
        let pool = lookup(pools, &swap.pool_id)?;
        let amount = self.relayer.resolve(swap.amount)?;
        let computed = self.swap(pool, swap.kind, swap.asset_in, swap.asset_out, amount)?;

        let (amount_in, amount_out) = match swap.kind {
            SwapKind::GivenIn => (amount, computed),
            SwapKind::GivenOut => (computed, amount),
        };
        if let Some(limit) = request.limit {
            let within = match swap.kind {
                SwapKind::GivenIn => amount_out >= limit,
                SwapKind::GivenOut => amount_in <= limit,
            };
            if !within {
                return Err(Error::LimitExceeded {
                    token: match swap.kind {
                        SwapKind::GivenIn => swap.asset_out,
                        SwapKind::GivenOut => swap.asset_in,
                    },
                    amount: computed,
                    limit,
                });
            }
        }
        if let Some(reference) = request.output_reference {
            self.relayer.write(reference, computed)?;
        }

        Ok((
            vec![swap.asset_out, swap.asset_in],
            vec![positive(amount_out)?, negative(amount_in)?],
        ))
    }

    /// Returns one amount per asset of the request, in asset order. Assets no
    /// step touches stay at zero.
    pub fn do_batch_swap(
        &mut self,
        request: &BatchSwapRequest,
        pools: &Pools,
    ) -> Result<Step, Error> {
        let assets = &request.assets;
        let mut deltas = vec![I256::ZERO; assets.len()];
        let asset = |index: usize| {
            assets.get(index).copied().ok_or(Error::IndexOutOfRange {
                index,
                len: assets.len(),
            })
        };

        for (i, step) in request.swaps.iter().enumerate() {
            let pool = lookup(pools, &step.pool_id)?;
            let (asset_in, asset_out) = (asset(step.asset_in_index)?, asset(step.asset_out_index)?);
            let amount = self.relayer.resolve(step.amount)?;
            if amount.is_zero() {
                tracing::trace!(step = i, "skipping zero amount swap");
                continue;
            }
            let computed = self.swap(pool, request.kind, asset_in, asset_out, amount)?;
            let (amount_in, amount_out) = match request.kind {
                SwapKind::GivenIn => (amount, computed),
                SwapKind::GivenOut => (computed, amount),
            };

            let delta_in = &mut deltas[step.asset_in_index];
            *delta_in = delta_in.checked_sub(signed(amount_in)?).ok_or(Error::Overflow)?;
            let delta_out = &mut deltas[step.asset_out_index];
            *delta_out = delta_out.checked_add(signed(amount_out)?).ok_or(Error::Overflow)?;
        }

        if !request.limits.is_empty() {
            if request.limits.len() != assets.len() {
                return Err(Error::MalformedRequest(format!(
                    "{} limits for {} assets",
                    request.limits.len(),
                    assets.len()
                )));
            }
            for ((token, delta), limit) in assets.iter().zip(&deltas).zip(&request.limits) {
                // Limits bound what the vault receives, the opposite sign of
                // the user's delta.
                let vault_delta = delta.checked_neg().ok_or(Error::Overflow)?;
                if vault_delta > *limit {
                    return Err(Error::LimitExceeded {
                        token: *token,
                        amount: delta.unsigned_abs(),
                        limit: limit.unsigned_abs(),
                    });
                }
            }
        }

        let magnitudes = deltas.iter().map(|d| d.unsigned_abs()).collect::<Vec<_>>();
        self.write_references(&request.output_references, &magnitudes)?;

        Ok((assets.clone(), deltas))
    }

    /// Computes the amount out for given in swaps and the amount in for given
    /// out swaps.
    fn swap(
        &self,
        pool: &Pool,
        kind: SwapKind,
        asset_in: Address,
        asset_out: Address,
        amount: U256,
    ) -> Result<U256, Error> {
        if asset_in == asset_out {
            return Err(Error::SameToken(asset_in));
        }
        let index = |token| {
            pool.token_index(token).ok_or(Error::TokenNotInPool {
                pool_id: pool.id,
                token,
            })
        };
        let swap = Swap {
            kind,
            token_in: index(asset_in)?,
            token_out: index(asset_out)?,
            amount,
        };
        self.math
            .get(pool.pool_type())
            .and_then(|math| math.swap(pool, &swap))
            .map_err(|err| Error::math(pool.id, err))
    }

    fn write_references(
        &mut self,
        references: &[OutputReferenceIndex],
        amounts: &[U256],
    ) -> Result<(), Error> {
        for reference in references {
            let amount = amounts.get(reference.index).ok_or(Error::IndexOutOfRange {
                index: reference.index,
                len: amounts.len(),
            })?;
            self.relayer.write(reference.key, *amount)?;
        }
        Ok(())
    }
}

fn lookup<'p>(pools: &'p Pools, id: &PoolId) -> Result<&'p Pool, Error> {
    pools.get(id).ok_or(Error::PoolNotFound(*id))
}

/// Join and exit assets must list the pool tokens in pool order.
fn check_assets(pool: &Pool, assets: &[Address]) -> Result<(), Error> {
    if !pool.token_addresses().eq(assets.iter().copied()) {
        return Err(Error::TokensMismatch(pool.id));
    }
    Ok(())
}

/// Checks per asset limits. An empty list of limits is not checked.
fn check_limits(
    assets: &[Address],
    limits: &[U256],
    amounts: &[U256],
    within: impl Fn(U256, U256) -> bool,
) -> Result<(), Error> {
    if limits.is_empty() {
        return Ok(());
    }
    if limits.len() != amounts.len() {
        return Err(Error::MalformedRequest(format!(
            "{} limits for {} assets",
            limits.len(),
            amounts.len()
        )));
    }
    for ((token, amount), limit) in assets.iter().zip(amounts).zip(limits) {
        if !within(*amount, *limit) {
            return Err(Error::LimitExceeded {
                token: *token,
                amount: *amount,
                limit: *limit,
            });
        }
    }
    Ok(())
}

fn signed(amount: U256) -> Result<I256, Error> {
    conv::u256_to_i256(amount).ok_or(Error::Overflow)
}

fn positive(amount: U256) -> Result<I256, Error> {
    signed(amount)
}

fn negative(amount: U256) -> Result<I256, Error> {
    Ok(-signed(amount)?)
}

impl Error {
    fn math(pool_id: PoolId, source: math::Error) -> Self {
        Self::Math { pool_id, source }
    }
}
