//!
//! # Reward math
//!
//! All in truncating integer arithmetic. The per-validator yearly rate
//! is a basis-point fraction of the weighted delegation total, so a
//! delegation's effective rate scales with its locktime bonus, and the
//! per-weighted-unit rate is identical across validators.
//!

use crate::arith::{calculate_fraction, saturating_sub};
use crate::delegation::increase_reward_delegation;
use crate::storage::*;
use crate::types::*;
use mp_core::{account::Balance, context::Context};
use ruc::*;

/// Reward period covered by one election.
pub fn election_period_seconds(params: &Params, last: Option<u64>, now: u64) -> u64 {
    if params.election_cycle_length == 0 {
        return SIMULATED_ELECTION_CYCLE_SECONDS;
    }
    match last {
        Some(last) => now.saturating_sub(last),
        None => params.election_cycle_length,
    }
}

/// Yearly reward owed to one validator: the base rate on its weighted
/// delegation total, reduced by slashing, capped at its pro-rata share
/// of the yearly budget.
pub fn yearly_reward(
    statistic: &ValidatorStatistic,
    params: &Params,
    combined_delegation_total: Balance,
) -> Balance {
    let mut reward =
        calculate_fraction(BLOCK_REWARD_BASIS_POINTS, statistic.delegation_total);
    if statistic.slash_percentage > 0 {
        reward = calculate_fraction(
            BASIS_POINTS.saturating_sub(statistic.slash_percentage),
            reward,
        );
    }
    if !params.max_yearly_reward.is_zero() && !combined_delegation_total.is_zero() {
        let share_cap = params.max_yearly_reward * statistic.delegation_total
            / combined_delegation_total;
        reward = reward.min(share_cap);
    }
    reward
}

/// Reward minted for one validator over one election period.
pub fn period_reward(
    statistic: &ValidatorStatistic,
    params: &Params,
    combined_delegation_total: Balance,
    elapsed_seconds: u64,
) -> Balance {
    yearly_reward(statistic, params, combined_delegation_total)
        * Balance::from(elapsed_seconds)
        / Balance::from(YEAR_SECONDS)
}

/// Count `reward` against the rolling yearly budget and return the
/// amount that still fits.
fn charge_yearly_budget(
    ctx: &Context,
    params: &Params,
    reward: Balance,
    now: u64,
) -> Balance {
    if params.max_yearly_reward.is_zero() {
        return reward;
    }
    let mut year = RewardYearStore::get(ctx.store.clone()).unwrap_or_default();
    if year.start == 0 {
        year.start = now;
    }
    while now >= year.start + YEAR_SECONDS {
        year.start += YEAR_SECONDS;
        year.minted = Balance::zero();
    }
    let granted = reward.min(saturating_sub(params.max_yearly_reward, year.minted));
    year.minted += granted;
    RewardYearStore::put(ctx.store.clone(), year);
    granted
}

/// Mint this period's rewards to the sitting validator set, fanning each
/// validator's reward out to its delegators by weighted stake.
pub(crate) fn distribute_rewards(ctx: &Context, params: &Params, now: u64) -> Result<()> {
    let set = ValidatorSetStore::get(ctx.store.clone()).unwrap_or_default();
    if set.is_empty() {
        return Ok(());
    }

    let last = LastElectionTimeStore::get(ctx.store.clone());
    let elapsed = election_period_seconds(params, last, now);

    let statistics: Vec<ValidatorStatistic> = set
        .iter()
        .filter_map(|v| StatisticStore::get(ctx.store.clone(), &v.address))
        .collect();
    let combined = statistics
        .iter()
        .fold(Balance::zero(), |acc, s| acc + s.delegation_total);

    for mut statistic in statistics.into_iter() {
        let reward = period_reward(&statistic, params, combined, elapsed);
        let reward = charge_yearly_budget(ctx, params, reward, now);
        if reward.is_zero() {
            continue;
        }
        distribute_validator_reward(ctx, &statistic, reward);
        statistic.distribution_total += reward;
        StatisticStore::insert(ctx.store.clone(), &statistic.address, &statistic);
    }
    Ok(())
}

/// Split one validator's period reward across its delegations. The fee
/// cut and the whitelist shadow's share accrue to the validator itself;
/// division dust stays unminted.
fn distribute_validator_reward(
    ctx: &Context,
    statistic: &ValidatorStatistic,
    reward: Balance,
) {
    let total_weight = statistic.delegation_total;
    if total_weight.is_zero() {
        return;
    }
    let fee = CandidateStore::get(ctx.store.clone(), &statistic.address)
        .map(|c| c.fee)
        .unwrap_or(0);

    for (_, delegation) in
        DelegationStore::iterate_prefix(ctx.store.clone(), &statistic.address)
    {
        if delegation.amount.is_zero() {
            continue;
        }
        let share = reward * delegation.weighted_amount() / total_weight;
        if share.is_zero() {
            continue;
        }
        let fee_cut = calculate_fraction(fee, share);
        if !fee_cut.is_zero() {
            increase_reward_delegation(ctx, &statistic.address, &statistic.address, fee_cut);
        }
        let delegator_share = share - fee_cut;
        if !delegator_share.is_zero() {
            increase_reward_delegation(
                ctx,
                &statistic.address,
                &delegation.delegator,
                delegator_share,
            );
        }
    }

    if !statistic.whitelist_amount.is_zero() {
        let weighted = calculate_fraction(
            statistic.whitelist_locktime_tier.bonus_basis_points(),
            statistic.whitelist_amount,
        );
        let share = reward * weighted / total_weight;
        if !share.is_zero() {
            increase_reward_delegation(ctx, &statistic.address, &statistic.address, share);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::scientific_notation;

    fn params_with_cycle(cycle: u64) -> Params {
        Params::from_request(InitRequest {
            election_cycle_length: cycle,
            ..Default::default()
        })
    }

    #[test]
    fn one_year_of_cycles_accrues_about_five_percent() {
        let cycle = 100u64;
        let params = params_with_cycle(cycle);
        let statistic = ValidatorStatistic {
            delegation_total: Balance::from(10_000_000_000_000u64),
            ..Default::default()
        };

        let mut total = Balance::zero();
        let mut t = 0u64;
        while t < YEAR_SECONDS {
            total += period_reward(&statistic, &params, Balance::zero(), cycle);
            t += cycle;
        }

        // roughly 5% of the delegation total, shy of it by cycle dust
        assert!(total > Balance::from(490_000_000_000u64));
        assert!(total < Balance::from(510_000_000_000u64));
    }

    #[test]
    fn zero_cycle_uses_the_simulated_period() {
        let params = params_with_cycle(0);
        assert_eq!(
            election_period_seconds(&params, Some(12345), 99999),
            SIMULATED_ELECTION_CYCLE_SECONDS
        );

        // ((1000 * 10^18) * 0.05 * 2) / (365 * 24 * 3600)
        let statistic = ValidatorStatistic {
            delegation_total: scientific_notation(1000, TOKEN_DECIMALS),
            ..Default::default()
        };
        let reward = period_reward(
            &statistic,
            &params,
            Balance::zero(),
            SIMULATED_ELECTION_CYCLE_SECONDS,
        );
        assert_eq!(reward, Balance::from(3_170_979_198_376u64));
    }

    #[test]
    fn slashing_scales_the_reward_down() {
        let params = params_with_cycle(0);
        let clean = ValidatorStatistic {
            delegation_total: Balance::from(1_000_000u64),
            ..Default::default()
        };
        let slashed = ValidatorStatistic {
            slash_percentage: 5_000,
            ..clean.clone()
        };
        let full = yearly_reward(&clean, &params, Balance::zero());
        let half = yearly_reward(&slashed, &params, Balance::zero());
        assert_eq!(half, full / Balance::from(2u64));
    }

    #[test]
    fn yearly_budget_caps_the_rate_pro_rata() {
        let mut params = params_with_cycle(0);
        params.max_yearly_reward = scientific_notation(100, TOKEN_DECIMALS);

        // at 2000 total the 5% rate sits exactly on the budget
        let statistic = ValidatorStatistic {
            delegation_total: scientific_notation(1000, TOKEN_DECIMALS),
            ..Default::default()
        };
        let at_cap = yearly_reward(
            &statistic,
            &params,
            scientific_notation(2000, TOKEN_DECIMALS),
        );
        assert_eq!(at_cap, scientific_notation(50, TOKEN_DECIMALS));

        // a third 1000-token delegation pushes past it: each validator
        // now earns 2/3 of the uncapped rate
        let at_capped = yearly_reward(
            &statistic,
            &params,
            scientific_notation(3000, TOKEN_DECIMALS),
        );
        assert_eq!(
            at_capped,
            params.max_yearly_reward * Balance::from(1000u64) / Balance::from(3000u64)
        );
        assert!(at_capped < at_cap);
    }
}
