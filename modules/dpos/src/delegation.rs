//!
//! # Delegation ledger
//!
//! Indexed (validator, delegator, index) records and their lifecycle
//! entry points. Stake movements are two-phase: requests mark a record
//! here, the next election settles it.
//!

use crate::storage::*;
use crate::types::*;
use crate::{Config, DPOS_MODULE_ADDRESS, LIMBO_VALIDATOR_ADDRESS};
use mp_core::{account::Balance, context::Context, crypto::Address, ensure};
use mp_traits::token::FungibleToken;
use ruc::*;

pub fn get_delegation(
    ctx: &Context,
    validator: &Address,
    delegator: &Address,
    index: u64,
) -> Option<Delegation> {
    DelegationStore::get(
        ctx.store.clone(),
        validator,
        &DelegationKey::new(delegator.clone(), index),
    )
}

pub(crate) fn set_delegation(ctx: &Context, delegation: &Delegation) {
    DelegationStore::insert(
        ctx.store.clone(),
        &delegation.validator,
        &DelegationKey::new(delegation.delegator.clone(), delegation.index),
        delegation,
    );
}

pub(crate) fn delete_delegation(
    ctx: &Context,
    validator: &Address,
    delegator: &Address,
    index: u64,
) {
    DelegationStore::remove(
        ctx.store.clone(),
        validator,
        &DelegationKey::new(delegator.clone(), index),
    );
}

/// Fresh index for a new (validator, delegator) delegation. Indices are
/// never reused, so deleting a record cannot resurrect an old key.
pub(crate) fn next_delegation_index(
    ctx: &Context,
    validator: &Address,
    delegator: &Address,
) -> u64 {
    let index = DelegationNonceStore::get(ctx.store.clone(), validator, delegator)
        .unwrap_or(REWARD_DELEGATION_INDEX)
        + 1;
    DelegationNonceStore::insert(ctx.store.clone(), validator, delegator, &index);
    index
}

/// Materialize the index-0 reward delegation of a pair the first time
/// it transacts. It is never locked and only reward accrual writes to
/// its amount.
pub(crate) fn ensure_reward_delegation(
    ctx: &Context,
    validator: &Address,
    delegator: &Address,
) {
    if get_delegation(ctx, validator, delegator, REWARD_DELEGATION_INDEX).is_none() {
        set_delegation(
            ctx,
            &Delegation {
                validator: validator.clone(),
                delegator: delegator.clone(),
                index: REWARD_DELEGATION_INDEX,
                amount: Balance::zero(),
                update_amount: Balance::zero(),
                locktime_tier: LocktimeTier::Tier0,
                lock_time: 0,
                state: DelegationState::Bonded,
                redelegation_target: None,
            },
        );
    }
}

/// Accrue a minted reward directly into a pair's index-0 delegation.
pub(crate) fn increase_reward_delegation(
    ctx: &Context,
    validator: &Address,
    delegator: &Address,
    amount: Balance,
) {
    ensure_reward_delegation(ctx, validator, delegator);
    if let Some(mut delegation) =
        get_delegation(ctx, validator, delegator, REWARD_DELEGATION_INDEX)
    {
        delegation.amount += amount;
        set_delegation(ctx, &delegation);
    }
}

/// A delegation may only reference a registered candidate, or the limbo
/// sentinel used to park stake.
fn ensure_known_validator(ctx: &Context, validator: &Address) -> Result<()> {
    if validator == &*LIMBO_VALIDATOR_ADDRESS {
        return Ok(());
    }
    ensure!(
        CandidateStore::contains_key(ctx.store.clone(), validator),
        "validator is not a registered candidate"
    );
    Ok(())
}

pub fn delegate<C: Config>(
    ctx: &Context,
    sender: &Address,
    validator: &Address,
    amount: Balance,
    locktime_tier: u64,
) -> Result<()> {
    ensure!(!amount.is_zero(), "delegation amount must be positive");
    let tier = LocktimeTier::from_u64(locktime_tier).c(d!())?;
    ensure_known_validator(ctx, validator).c(d!())?;

    C::Coin::transfer_from(ctx, &DPOS_MODULE_ADDRESS, sender, &DPOS_MODULE_ADDRESS, amount)
        .c(d!("coin transfer failed"))?;

    ensure_reward_delegation(ctx, validator, sender);
    let index = next_delegation_index(ctx, validator, sender);
    let now = ctx.block_time();
    set_delegation(
        ctx,
        &Delegation {
            validator: validator.clone(),
            delegator: sender.clone(),
            index,
            amount: Balance::zero(),
            update_amount: amount,
            locktime_tier: tier,
            lock_time: now + tier.seconds(),
            state: DelegationState::Bonding,
            redelegation_target: None,
        },
    );
    log::debug!(
        target: "dpos",
        "{} delegated {} to {} at index {}",
        sender, amount, validator, index
    );
    Ok(())
}

pub fn redelegate(
    ctx: &Context,
    sender: &Address,
    former_validator: &Address,
    validator: &Address,
    amount: Balance,
    index: u64,
    new_locktime_tier: Option<u64>,
) -> Result<()> {
    ensure!(!amount.is_zero(), "redelegation amount must be positive");
    ensure!(
        former_validator != validator,
        "redelegation to the same validator"
    );
    ensure_known_validator(ctx, validator).c(d!())?;

    let mut source = get_delegation(ctx, former_validator, sender, index)
        .c(d!("delegation not found"))?;
    ensure!(
        source.state == DelegationState::Bonded,
        "delegation is not in a bonded state"
    );
    ensure!(
        source.amount >= amount,
        "redelegation amount exceeds the delegation"
    );

    let now = ctx.block_time();
    if validator != &*LIMBO_VALIDATOR_ADDRESS {
        ensure!(now >= source.lock_time, "delegation lock has not expired");
    }

    let tier = match new_locktime_tier {
        Some(raw) => {
            let tier = LocktimeTier::from_u64(raw).c(d!())?;
            ensure!(
                tier >= source.locktime_tier || now >= source.lock_time,
                "cannot lower the locktime tier before the lock expires"
            );
            tier
        }
        None => source.locktime_tier,
    };
    // an upgraded commitment restarts the lock
    let lock_time = if tier != source.locktime_tier {
        now + tier.seconds()
    } else {
        source.lock_time
    };

    if amount == source.amount {
        source.state = DelegationState::Redelegating;
        source.update_amount = amount;
        source.redelegation_target = Some(validator.clone());
        source.locktime_tier = tier;
        source.lock_time = lock_time;
        set_delegation(ctx, &source);
    } else {
        // split off part of the stake; the source stays bonded
        source.amount -= amount;
        set_delegation(ctx, &source);

        ensure_reward_delegation(ctx, validator, sender);
        let new_index = next_delegation_index(ctx, validator, sender);
        set_delegation(
            ctx,
            &Delegation {
                validator: validator.clone(),
                delegator: sender.clone(),
                index: new_index,
                amount: Balance::zero(),
                update_amount: amount,
                locktime_tier: tier,
                lock_time,
                state: DelegationState::Bonding,
                redelegation_target: None,
            },
        );
    }
    Ok(())
}

pub fn unbond(
    ctx: &Context,
    sender: &Address,
    validator: &Address,
    amount: Balance,
    index: u64,
) -> Result<()> {
    ensure!(!amount.is_zero(), "unbond amount must be positive");
    let mut delegation =
        get_delegation(ctx, validator, sender, index).c(d!("delegation not found"))?;
    ensure!(
        delegation.state == DelegationState::Bonded,
        "delegation is not in a bonded state"
    );
    ensure!(
        ctx.block_time() >= delegation.lock_time,
        "delegation lock has not expired"
    );
    ensure!(
        delegation.amount >= amount,
        "unbond amount exceeds the delegation"
    );

    delegation.state = DelegationState::Unbonding;
    delegation.update_amount = amount;
    set_delegation(ctx, &delegation);
    Ok(())
}

/// Every delegation a delegator holds with `validator`. Unknown pairs
/// yield an empty summary rather than an error.
pub fn check_delegation(
    ctx: &Context,
    validator: &Address,
    delegator: &Address,
) -> DelegationsSummary {
    summarize(
        DelegationStore::iterate_prefix(ctx.store.clone(), validator)
            .into_iter()
            .map(|(_, d)| d)
            .filter(|d| &d.delegator == delegator),
    )
}

/// Every delegation a delegator holds, across all validators.
pub fn check_all_delegations(ctx: &Context, delegator: &Address) -> DelegationsSummary {
    summarize(
        DelegationStore::iterate(ctx.store.clone())
            .into_iter()
            .map(|(_, _, d)| d)
            .filter(|d| &d.delegator == delegator),
    )
}

/// The index-0 reward delegation of a pair; empty if it was never
/// materialized.
pub fn check_reward_delegation(
    ctx: &Context,
    validator: &Address,
    delegator: &Address,
) -> Delegation {
    get_delegation(ctx, validator, delegator, REWARD_DELEGATION_INDEX).unwrap_or(
        Delegation {
            validator: validator.clone(),
            delegator: delegator.clone(),
            index: REWARD_DELEGATION_INDEX,
            amount: Balance::zero(),
            update_amount: Balance::zero(),
            locktime_tier: LocktimeTier::Tier0,
            lock_time: 0,
            state: DelegationState::Bonded,
            redelegation_target: None,
        },
    )
}

pub fn list_all_delegations(ctx: &Context) -> Vec<Delegation> {
    DelegationStore::iterate(ctx.store.clone())
        .into_iter()
        .map(|(_, _, d)| d)
        .collect()
}

pub fn delegations_count(ctx: &Context) -> u64 {
    DelegationStore::iterate(ctx.store.clone()).len() as u64
}

fn summarize(delegations: impl Iterator<Item = Delegation>) -> DelegationsSummary {
    let mut summary = DelegationsSummary::default();
    for d in delegations {
        summary.amount += d.amount;
        summary.weighted_amount += d.weighted_amount();
        summary.delegations.push(d);
    }
    summary
}
