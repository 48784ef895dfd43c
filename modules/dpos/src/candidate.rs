//!
//! # Candidate registry
//!
//! Registration escrow is held as a self-delegation so that a freshly
//! registered candidate is immediately electable on its own stake.
//!

use crate::storage::*;
use crate::types::*;
use crate::{delegation, Config, DPOS_MODULE_ADDRESS};
use mp_core::{account::Balance, context::Context, crypto::Address, ensure};
use mp_traits::token::FungibleToken;
use ruc::*;

pub fn register_candidate<C: Config>(
    ctx: &Context,
    sender: &Address,
    pub_key: Vec<u8>,
    fee: u64,
) -> Result<()> {
    let params = crate::params(ctx).c(d!())?;
    ensure!(fee <= BASIS_POINTS, "fee exceeds one hundred percent");
    ensure!(
        !CandidateStore::contains_key(ctx.store.clone(), sender),
        "candidate already registered"
    );
    ensure!(
        &Address::from_public_key(&pub_key) == sender,
        "public key does not match the sender address"
    );

    let whitelisted = StatisticStore::get(ctx.store.clone(), sender)
        .map(|s| !s.whitelist_amount.is_zero())
        .unwrap_or(false);

    let mut registration_index = 0;
    if !whitelisted && !params.registration_requirement.is_zero() {
        C::Coin::transfer_from(
            ctx,
            &DPOS_MODULE_ADDRESS,
            sender,
            &DPOS_MODULE_ADDRESS,
            params.registration_requirement,
        )
        .c(d!("registration fee transfer failed"))?;

        delegation::ensure_reward_delegation(ctx, sender, sender);
        let index = delegation::next_delegation_index(ctx, sender, sender);
        delegation::set_delegation(
            ctx,
            &Delegation {
                validator: sender.clone(),
                delegator: sender.clone(),
                index,
                amount: Balance::zero(),
                update_amount: params.registration_requirement,
                locktime_tier: LocktimeTier::Tier0,
                lock_time: ctx.block_time(),
                state: DelegationState::Bonding,
                redelegation_target: None,
            },
        );
        registration_index = index;
    }

    CandidateStore::insert(
        ctx.store.clone(),
        sender,
        &Candidate {
            address: sender.clone(),
            pub_key,
            fee,
            new_fee: fee,
            fee_state: FeeState::Registered,
            registration_index,
        },
    );
    log::debug!(target: "dpos", "candidate {} registered with fee {}", sender, fee);
    Ok(())
}

/// Remove the candidate and give the registration escrow back: straight
/// away while it is still bonding, through the regular unbonding path
/// otherwise. Existing delegations to the candidate are left in place.
pub fn unregister_candidate<C: Config>(ctx: &Context, sender: &Address) -> Result<()> {
    let candidate = CandidateStore::get(ctx.store.clone(), sender)
        .c(d!("candidate is not registered"))?;

    if candidate.registration_index != 0 {
        if let Some(mut escrow) =
            delegation::get_delegation(ctx, sender, sender, candidate.registration_index)
        {
            match escrow.state {
                DelegationState::Bonding => {
                    C::Coin::transfer(
                        ctx,
                        &DPOS_MODULE_ADDRESS,
                        sender,
                        escrow.update_amount,
                    )
                    .c(d!("registration fee refund failed"))?;
                    delegation::delete_delegation(ctx, sender, sender, escrow.index);
                }
                DelegationState::Bonded => {
                    escrow.state = DelegationState::Unbonding;
                    escrow.update_amount = escrow.amount;
                    delegation::set_delegation(ctx, &escrow);
                }
                _ => {}
            }
        }
    }

    CandidateStore::remove(ctx.store.clone(), sender);
    Ok(())
}

/// Schedule a fee change; it becomes effective on the second election
/// after the request.
pub fn change_fee(ctx: &Context, sender: &Address, fee: u64) -> Result<()> {
    ensure!(fee <= BASIS_POINTS, "fee exceeds one hundred percent");
    let mut candidate = CandidateStore::get(ctx.store.clone(), sender)
        .c(d!("candidate is not registered"))?;
    candidate.new_fee = fee;
    candidate.fee_state = FeeState::ChangeRequested;
    CandidateStore::insert(ctx.store.clone(), sender, &candidate);
    Ok(())
}

/// Advance every pending fee change by one election.
pub(crate) fn rotate_fees(ctx: &Context) {
    for (address, mut candidate) in CandidateStore::iterate(ctx.store.clone()) {
        match candidate.fee_state {
            FeeState::Registered => continue,
            FeeState::ChangeRequested => {
                candidate.fee_state = FeeState::ChangeAboutToApply;
            }
            FeeState::ChangeAboutToApply => {
                candidate.fee = candidate.new_fee;
                candidate.fee_state = FeeState::Registered;
            }
        }
        CandidateStore::insert(ctx.store.clone(), &address, &candidate);
    }
}

pub fn list_candidates(ctx: &Context) -> Vec<Candidate> {
    CandidateStore::iterate(ctx.store.clone())
        .into_iter()
        .map(|(_, c)| c)
        .collect()
}
