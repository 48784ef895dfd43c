//!
//! # Election engine
//!
//! One atomic pass per trigger: pay the sitting validators, settle
//! pending delegation updates, rank candidates by weighted stake and
//! persist the capped validator set. The caller's session semantics
//! guarantee that a failure in any sub-step leaves no partial writes.
//!

use crate::arith::calculate_fraction;
use crate::delegation::{
    delete_delegation, ensure_reward_delegation, next_delegation_index, set_delegation,
};
use crate::storage::*;
use crate::types::*;
use crate::{candidate, power, reward, Config, DPOS_MODULE_ADDRESS};
use mp_core::{account::Balance, context::Context, crypto::Address};
use mp_traits::token::FungibleToken;
use ruc::*;

pub fn elect<C: Config>(ctx: &Context) -> Result<()> {
    let params = crate::params(ctx).c(d!())?;
    let now = ctx.block_time();

    if let Some(last) = LastElectionTimeStore::get(ctx.store.clone()) {
        if params.election_cycle_length > 0
            && now.saturating_sub(last) < params.election_cycle_length
        {
            return Ok(());
        }
    }

    reward::distribute_rewards(ctx, &params, now).c(d!())?;
    apply_delegation_updates::<C>(ctx, now).c(d!())?;

    // rank candidates by weighted stake, ties by ascending address
    let mut ranked: Vec<(Balance, Candidate)> = Vec::new();
    for (address, candidate) in CandidateStore::iterate(ctx.store.clone()) {
        let weight = candidate_weight(ctx, &address);
        if weight.is_zero() {
            continue;
        }
        ranked.push((weight, candidate));
    }
    ranked.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.address.cmp(&b.1.address))
    });
    ranked.truncate(params.validator_count as usize);

    candidate::rotate_fees(ctx);

    let mut set = Vec::with_capacity(ranked.len());
    for (weight, elected) in ranked.into_iter() {
        let mut statistic = StatisticStore::get(ctx.store.clone(), &elected.address)
            .unwrap_or_default();
        statistic.address = elected.address.clone();
        statistic.pub_key = elected.pub_key.clone();
        statistic.delegation_total = weight;
        StatisticStore::insert(ctx.store.clone(), &elected.address, &statistic);

        set.push(Validator {
            address: elected.address,
            pub_key: elected.pub_key,
            power: token_power(weight),
        });
    }

    let cap_bp = power::power_cap_basis_points(params.crash_fault_tolerance_bp);
    let set = power::apply_power_cap(set, cap_bp);

    log::info!(
        target: "dpos",
        "election at {} seated {} validators",
        now,
        set.len()
    );
    ValidatorSetStore::put(ctx.store.clone(), set);
    LastElectionTimeStore::put(ctx.store.clone(), now);
    Ok(())
}

/// Seconds until the next `elect` trigger has an effect.
pub fn time_until_election(ctx: &Context) -> Result<u64> {
    let params = crate::params(ctx).c(d!())?;
    let now = ctx.block_time();
    Ok(match LastElectionTimeStore::get(ctx.store.clone()) {
        Some(last) => params
            .election_cycle_length
            .saturating_sub(now.saturating_sub(last)),
        None => 0,
    })
}

pub fn list_validators(ctx: &Context) -> Vec<ValidatorStatistic> {
    ValidatorSetStore::get(ctx.store.clone())
        .unwrap_or_default()
        .iter()
        .filter_map(|v| StatisticStore::get(ctx.store.clone(), &v.address))
        .collect()
}

pub fn validator_set(ctx: &Context) -> Vec<Validator> {
    ValidatorSetStore::get(ctx.store.clone()).unwrap_or_default()
}

/// Total rewards minted to date across the sitting validator set.
pub fn check_rewards(ctx: &Context) -> Balance {
    list_validators(ctx)
        .iter()
        .fold(Balance::zero(), |acc, s| acc + s.distribution_total)
}

/// Settle every pending delegation update, then downgrade the tier of
/// any bonded delegation whose lock has run out.
fn apply_delegation_updates<C: Config>(ctx: &Context, now: u64) -> Result<()> {
    for (validator, _, mut d) in DelegationStore::iterate(ctx.store.clone()) {
        match d.state {
            DelegationState::Bonding => {
                d.amount += d.update_amount;
                d.update_amount = Balance::zero();
                d.state = DelegationState::Bonded;
                set_delegation(ctx, &d);
            }
            DelegationState::Unbonding => {
                C::Coin::transfer(ctx, &DPOS_MODULE_ADDRESS, &d.delegator, d.update_amount)
                    .c(d!("unbond payout failed"))?;
                d.amount = d
                    .amount
                    .checked_sub(d.update_amount)
                    .c(d!("unbond exceeds the bonded amount"))?;
                d.update_amount = Balance::zero();
                d.state = DelegationState::Bonded;
                if d.amount.is_zero() && d.index != REWARD_DELEGATION_INDEX {
                    delete_delegation(ctx, &validator, &d.delegator, d.index);
                } else {
                    set_delegation(ctx, &d);
                }
            }
            DelegationState::Redelegating => {
                let target = d
                    .redelegation_target
                    .clone()
                    .c(d!("redelegation without a target"))?;
                delete_delegation(ctx, &validator, &d.delegator, d.index);

                ensure_reward_delegation(ctx, &target, &d.delegator);
                let index = next_delegation_index(ctx, &target, &d.delegator);
                set_delegation(
                    ctx,
                    &Delegation {
                        validator: target,
                        delegator: d.delegator,
                        index,
                        amount: d.update_amount,
                        update_amount: Balance::zero(),
                        locktime_tier: d.locktime_tier,
                        lock_time: d.lock_time,
                        state: DelegationState::Bonded,
                        redelegation_target: None,
                    },
                );
            }
            DelegationState::Bonded => {}
        }
    }

    for (_, _, mut d) in DelegationStore::iterate(ctx.store.clone()) {
        if d.lock_time <= now && d.locktime_tier != LocktimeTier::Tier0 {
            d.locktime_tier = LocktimeTier::Tier0;
            set_delegation(ctx, &d);
        }
    }
    Ok(())
}

/// A candidate's election weight: its bonded delegations plus the
/// whitelist shadow, each scaled by the locktime bonus.
fn candidate_weight(ctx: &Context, address: &Address) -> Balance {
    let mut weight = DelegationStore::iterate_prefix(ctx.store.clone(), address)
        .into_iter()
        .fold(Balance::zero(), |acc, (_, d)| acc + d.weighted_amount());

    if let Some(statistic) = StatisticStore::get(ctx.store.clone(), address) {
        weight += calculate_fraction(
            statistic.whitelist_locktime_tier.bonus_basis_points(),
            statistic.whitelist_amount,
        );
    }
    weight
}

/// Consensus voting power of a weighted stake, in whole tokens.
fn token_power(weight: Balance) -> u64 {
    let power = weight / Balance::exp10(TOKEN_DECIMALS);
    if power > Balance::from(u64::MAX) {
        u64::MAX
    } else {
        power.as_u64()
    }
}
