//!
//! # Oracle admission
//!
//! Whitelist and parameter mutations arrive as batches over a
//! best-effort transport. The persisted (block, tx, log) cursor makes
//! replays a silent no-op, so the oracle may resend freely.
//!

use crate::storage::*;
use crate::types::*;
use mp_core::{account::Balance, context::Context, crypto::Address, ensure};
use ruc::*;

pub fn process_request_batch(
    ctx: &Context,
    sender: &Address,
    batch: RequestBatch,
) -> Result<()> {
    let params = crate::params(ctx).c(d!())?;
    let oracle = params
        .oracle_address
        .clone()
        .c(d!("no oracle is configured"))?;
    ensure!(sender == &oracle, "sender is not the oracle");

    let mut tally =
        RequestBatchTallyStore::get(ctx.store.clone()).unwrap_or_default();

    for request in batch.batch.into_iter() {
        if !request.meta.is_newer_than(&tally) {
            log::debug!(
                target: "dpos",
                "skipping replayed oracle request at block {} tx {} log {}",
                request.meta.block_number, request.meta.tx_index, request.meta.log_index
            );
            continue;
        }

        match request.payload {
            BatchPayload::WhitelistCandidate {
                address,
                amount,
                locktime,
            } => whitelist_candidate(ctx, &address, amount, locktime),
            BatchPayload::RemoveWhitelistedCandidate { address } => {
                remove_whitelisted_candidate(ctx, &address).c(d!())?
            }
            BatchPayload::ChangeWhitelistAmount { address, amount } => {
                change_whitelist_amount(ctx, &address, amount).c(d!())?
            }
            BatchPayload::ChangeParams(change) => change_params(ctx, change).c(d!())?,
        }

        tally = RequestBatchTally {
            last_block: request.meta.block_number,
            last_tx: request.meta.tx_index,
            last_log: request.meta.log_index,
        };
    }

    RequestBatchTallyStore::put(ctx.store.clone(), tally);
    Ok(())
}

/// Grant shadow stake, creating a shell statistic when the address has
/// never been a candidate.
fn whitelist_candidate(ctx: &Context, address: &Address, amount: Balance, locktime: u64) {
    let mut statistic =
        StatisticStore::get(ctx.store.clone(), address).unwrap_or_default();
    statistic.address = address.clone();
    statistic.whitelist_amount = amount;
    statistic.whitelist_locktime_tier = LocktimeTier::from_raw_or_zero(locktime);
    StatisticStore::insert(ctx.store.clone(), address, &statistic);
}

/// Zero the whitelist entry. Candidacy and escrow are untouched.
fn remove_whitelisted_candidate(ctx: &Context, address: &Address) -> Result<()> {
    let mut statistic = StatisticStore::get(ctx.store.clone(), address)
        .c(d!("address has no whitelist entry"))?;
    statistic.whitelist_amount = Balance::zero();
    statistic.whitelist_locktime_tier = LocktimeTier::Tier0;
    StatisticStore::insert(ctx.store.clone(), address, &statistic);
    Ok(())
}

fn change_whitelist_amount(ctx: &Context, address: &Address, amount: Balance) -> Result<()> {
    let mut statistic = StatisticStore::get(ctx.store.clone(), address)
        .c(d!("address has no whitelist entry"))?;
    statistic.whitelist_amount = amount;
    StatisticStore::insert(ctx.store.clone(), address, &statistic);
    Ok(())
}

fn change_params(ctx: &Context, change: ParamsChange) -> Result<()> {
    let mut params = crate::params(ctx).c(d!())?;
    match change {
        ParamsChange::ValidatorCount(n) => {
            ensure!(n > 0, "validator count must be positive");
            params.validator_count = n;
        }
        ParamsChange::ElectionCycleLength(seconds) => {
            params.election_cycle_length = seconds;
        }
        ParamsChange::RegistrationRequirement(amount) => {
            params.registration_requirement = amount;
        }
        ParamsChange::MaxYearlyReward(amount) => {
            params.max_yearly_reward = amount;
        }
        ParamsChange::OracleAddress(address) => {
            params.oracle_address = Some(address);
        }
    }
    ParamsStore::put(ctx.store.clone(), params);
    Ok(())
}
