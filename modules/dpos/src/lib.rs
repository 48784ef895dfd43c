//!
//! # Delegated proof-of-stake module
//!
//! - candidate registry with escrowed registration and two-election fee
//!   changes
//! - token-weighted delegation ledger with locktime tiers
//! - oracle-gated whitelist admission over an idempotent batch cursor
//! - periodic elections distributing rewards and emitting a power-capped
//!   validator set
//!

pub mod arith;
mod candidate;
mod delegation;
mod election;
mod oracle;
mod power;
mod reward;
pub mod types;

use lazy_static::lazy_static;
use mp_core::{
    account::Balance,
    context::Context,
    crypto::Address,
    module::{AppModule, ResponseQuery, ValidatorUpdate},
    transaction::{ActionResult, Executable},
};
use mp_traits::token::FungibleToken;
use ruc::*;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use types::*;

pub use candidate::{change_fee, list_candidates, register_candidate, unregister_candidate};
pub use delegation::{
    check_all_delegations, check_delegation, check_reward_delegation, delegate,
    delegations_count, get_delegation, list_all_delegations, redelegate, unbond,
};
pub use election::{
    check_rewards, elect, list_validators, time_until_election, validator_set,
};
pub use oracle::process_request_batch;
pub use power::{apply_power_cap, power_cap_basis_points};
pub use reward::{election_period_seconds, period_reward, yearly_reward};

pub const MODULE_NAME: &str = "dpos";

lazy_static! {
    /// Escrow account holding pulled delegations and the reward fund.
    pub static ref DPOS_MODULE_ADDRESS: Address = Address::of_module(MODULE_NAME);
    /// The all-zero sentinel that accepts parked redelegations and is
    /// never elected.
    pub static ref LIMBO_VALIDATOR_ADDRESS: Address = Address::zero();
}

pub trait Config {
    /// The coin contract backing delegations, escrow and reward payouts.
    type Coin: FungibleToken;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Init(InitRequest),
    RegisterCandidate {
        pub_key: Vec<u8>,
        fee: u64,
    },
    UnregisterCandidate,
    ChangeFee {
        fee: u64,
    },
    Delegate {
        validator: Address,
        amount: Balance,
        locktime_tier: u64,
    },
    Redelegate {
        former_validator: Address,
        validator: Address,
        amount: Balance,
        index: u64,
        new_locktime_tier: Option<u64>,
    },
    Unbond {
        validator: Address,
        amount: Balance,
        index: u64,
    },
    ProcessRequestBatch(RequestBatch),
    Elect,
}

pub(crate) mod storage {
    use crate::types::{
        Candidate, Delegation, DelegationKey, Params, RequestBatchTally, RewardYear,
        Validator, ValidatorStatistic,
    };
    use mp_core::crypto::Address;
    use mp_storage::*;

    // Engine configuration, installed once at init
    generate_storage!(Dpos, ParamsStore => Value<Params>);
    // Registered candidates
    generate_storage!(Dpos, CandidateStore => Map<Address, Candidate>);
    // The delegation ledger, keyed (validator, delegator-index)
    generate_storage!(Dpos, DelegationStore => DoubleMap<Address, DelegationKey, Delegation>);
    // Highest index ever handed out per (validator, delegator)
    generate_storage!(Dpos, DelegationNonceStore => DoubleMap<Address, Address, u64>);
    // Per-validator statistics and whitelist shadow stake
    generate_storage!(Dpos, StatisticStore => Map<Address, ValidatorStatistic>);
    // The sitting consensus validator set
    generate_storage!(Dpos, ValidatorSetStore => Value<Vec<Validator>>);
    generate_storage!(Dpos, LastElectionTimeStore => Value<u64>);
    // Cursor over processed oracle batch items
    generate_storage!(Dpos, RequestBatchTallyStore => Value<RequestBatchTally>);
    // Rolling yearly mint tally
    generate_storage!(Dpos, RewardYearStore => Value<RewardYear>);
}

/// Engine parameters; errors until `Action::Init` has run.
pub(crate) fn params(ctx: &Context) -> Result<Params> {
    storage::ParamsStore::get(ctx.store.clone()).c(d!("dpos module is not initialized"))
}

pub fn get_params(ctx: &Context) -> Result<Params> {
    params(ctx)
}

fn init(ctx: &Context, request: InitRequest) -> Result<()> {
    if storage::ParamsStore::exists(ctx.store.clone()) {
        return Err(eg!("dpos module is already initialized"));
    }
    storage::ParamsStore::put(ctx.store.clone(), Params::from_request(request));
    Ok(())
}

pub struct App<C> {
    phantom: PhantomData<C>,
}

impl<C: Config> App<C> {
    pub fn new() -> Self {
        App {
            phantom: Default::default(),
        }
    }
}

impl<C: Config> Default for App<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Config> Executable for App<C> {
    type Origin = Address;
    type Call = Action;

    fn execute(
        origin: Option<Self::Origin>,
        call: Self::Call,
        ctx: &Context,
    ) -> Result<ActionResult> {
        let sender = origin.ok_or(eg!("invalid transaction origin"))?;
        match call {
            Action::Init(request) => init(ctx, request).c(d!())?,
            Action::RegisterCandidate { pub_key, fee } => {
                candidate::register_candidate::<C>(ctx, &sender, pub_key, fee).c(d!())?
            }
            Action::UnregisterCandidate => {
                candidate::unregister_candidate::<C>(ctx, &sender).c(d!())?
            }
            Action::ChangeFee { fee } => candidate::change_fee(ctx, &sender, fee).c(d!())?,
            Action::Delegate {
                validator,
                amount,
                locktime_tier,
            } => delegation::delegate::<C>(ctx, &sender, &validator, amount, locktime_tier)
                .c(d!())?,
            Action::Redelegate {
                former_validator,
                validator,
                amount,
                index,
                new_locktime_tier,
            } => delegation::redelegate(
                ctx,
                &sender,
                &former_validator,
                &validator,
                amount,
                index,
                new_locktime_tier,
            )
            .c(d!())?,
            Action::Unbond {
                validator,
                amount,
                index,
            } => delegation::unbond(ctx, &sender, &validator, amount, index).c(d!())?,
            Action::ProcessRequestBatch(batch) => {
                oracle::process_request_batch(ctx, &sender, batch).c(d!())?
            }
            Action::Elect => election::elect::<C>(ctx).c(d!())?,
        }
        Ok(ActionResult::default())
    }
}

impl<C: Config> AppModule for App<C> {
    fn name(&self) -> String {
        MODULE_NAME.to_string()
    }

    fn query_route(&self, ctx: Context, path: Vec<&str>, data: &[u8]) -> ResponseQuery {
        let mut resp = ResponseQuery::new();
        if path.len() != 1 {
            resp.code = 1;
            resp.log = String::from("dpos: invalid query path");
            return resp;
        }
        match path[0] {
            "candidates" => {
                resp.value =
                    serde_json::to_vec(&candidate::list_candidates(&ctx)).unwrap_or_default();
                resp
            }
            "validators" => {
                resp.value =
                    serde_json::to_vec(&election::list_validators(&ctx)).unwrap_or_default();
                resp
            }
            "delegation" => {
                let keys = serde_json::from_slice::<(Address, Address)>(data);
                if keys.is_err() {
                    resp.code = 1;
                    resp.log = String::from("dpos: query delegation with invalid params");
                    return resp;
                }
                let (validator, delegator) = keys.unwrap();
                let summary = delegation::check_delegation(&ctx, &validator, &delegator);
                resp.value = serde_json::to_vec(&summary).unwrap_or_default();
                resp
            }
            "all_delegations" => {
                let delegator = serde_json::from_slice::<Address>(data);
                if delegator.is_err() {
                    resp.code = 1;
                    resp.log = String::from("dpos: query delegations with invalid params");
                    return resp;
                }
                let summary =
                    delegation::check_all_delegations(&ctx, &delegator.unwrap());
                resp.value = serde_json::to_vec(&summary).unwrap_or_default();
                resp
            }
            "rewards" => {
                resp.value =
                    serde_json::to_vec(&election::check_rewards(&ctx)).unwrap_or_default();
                resp
            }
            _ => resp,
        }
    }

    /// Run the election and report the set change to consensus: zero
    /// out the previous validators, then announce the new set.
    fn end_block(&mut self, ctx: &mut Context, _height: u64) -> Vec<ValidatorUpdate> {
        let previous = election::validator_set(ctx);
        if let Err(e) = election::elect::<C>(ctx) {
            log::error!(target: "dpos", "election failed: {}", e);
            return Vec::new();
        }

        let mut updates = Vec::new();
        for validator in previous.iter() {
            updates.push(ValidatorUpdate {
                pub_key: validator.pub_key.clone(),
                power: 0,
            });
        }
        for validator in election::validator_set(ctx).into_iter() {
            updates.push(ValidatorUpdate {
                pub_key: validator.pub_key,
                power: validator.power,
            });
        }
        updates
    }
}
