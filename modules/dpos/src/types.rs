use mp_core::{account::Balance, crypto::Address};
use ruc::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Denominator of all basis-point fractions.
pub const BASIS_POINTS: u64 = 10_000;

/// Token amounts are carried in minimal base units.
pub const TOKEN_DECIMALS: usize = 18;

pub const YEAR_SECONDS: u64 = 365 * 24 * 3600;

/// Yearly reward rate applied to a validator's weighted delegation total.
pub const BLOCK_REWARD_BASIS_POINTS: u64 = 500;

/// Reward period assumed for a single election when the configured
/// election cycle length is zero ("elect on every trigger").
pub const SIMULATED_ELECTION_CYCLE_SECONDS: u64 = 2;

/// Largest share of the total voting power a single validator may hold.
pub const POWER_CAP_BASIS_POINTS: u64 = 2_800;

/// Index reserved per (validator, delegator) for the accrued-reward
/// delegation. User delegations start at index 1.
pub const REWARD_DELEGATION_INDEX: u64 = 0;

pub const DEFAULT_VALIDATOR_COUNT: u64 = 21;
pub const DEFAULT_REGISTRATION_REQUIREMENT: u64 = 1_250_000;
pub const DEFAULT_MAX_YEARLY_REWARD: u64 = 60_000_000;
pub const DEFAULT_CRASH_FAULT_TOLERANCE_BASIS_POINTS: u64 = 3_333;

/// Minimum bond duration per locktime tier, in seconds:
/// none, two weeks, three months, one year.
pub const TIER_LOCKTIME_SECONDS: [u64; 4] = [0, 1_209_600, 7_884_000, 31_536_000];

/// Reward/weight multiplier per locktime tier, in basis points.
pub const TIER_BONUS_BASIS_POINTS: [u64; 4] = [10_000, 15_000, 20_000, 40_000];

/// Discrete commitment level of a delegation.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum LocktimeTier {
    Tier0,
    Tier1,
    Tier2,
    Tier3,
}

impl Default for LocktimeTier {
    fn default() -> Self {
        LocktimeTier::Tier0
    }
}

impl LocktimeTier {
    pub fn from_u64(raw: u64) -> Result<Self> {
        match raw {
            0 => Ok(LocktimeTier::Tier0),
            1 => Ok(LocktimeTier::Tier1),
            2 => Ok(LocktimeTier::Tier2),
            3 => Ok(LocktimeTier::Tier3),
            _ => Err(eg!("locktime tier out of range")),
        }
    }

    /// Oracle rows carry raw locktime values from a foreign chain;
    /// anything out of range collapses to the no-lock tier.
    pub fn from_raw_or_zero(raw: u64) -> Self {
        Self::from_u64(raw).unwrap_or(LocktimeTier::Tier0)
    }

    pub fn seconds(self) -> u64 {
        TIER_LOCKTIME_SECONDS[self as usize]
    }

    pub fn bonus_basis_points(self) -> u64 {
        TIER_BONUS_BASIS_POINTS[self as usize]
    }
}

/// Engine configuration. Installed once at init, mutable only through
/// oracle request batches.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub validator_count: u64,
    /// Minimum seconds between two meaningful elections; zero runs an
    /// election on every trigger.
    pub election_cycle_length: u64,
    pub oracle_address: Option<Address>,
    /// Stake escrowed when a non-whitelisted candidate registers.
    pub registration_requirement: Balance,
    /// Upper bound on rewards minted per year, zero disables the cap.
    pub max_yearly_reward: Balance,
    /// Assumed crash-fault tolerance of the consensus layer; bounds the
    /// power cap at `1 - f`.
    pub crash_fault_tolerance_bp: u64,
}

/// Init-time view of `Params`; absent optional fields fall back to the
/// defaults, which is distinct from an explicit zero.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct InitRequest {
    pub validator_count: u64,
    pub election_cycle_length: u64,
    pub oracle_address: Option<Address>,
    pub registration_requirement: Option<Balance>,
    pub max_yearly_reward: Option<Balance>,
    pub crash_fault_tolerance_bp: Option<u64>,
}

impl Params {
    pub fn from_request(req: InitRequest) -> Self {
        let whole_tokens =
            |n: u64| crate::arith::scientific_notation(n, TOKEN_DECIMALS);
        Params {
            validator_count: if req.validator_count == 0 {
                DEFAULT_VALIDATOR_COUNT
            } else {
                req.validator_count
            },
            election_cycle_length: req.election_cycle_length,
            oracle_address: req.oracle_address,
            registration_requirement: req
                .registration_requirement
                .unwrap_or_else(|| whole_tokens(DEFAULT_REGISTRATION_REQUIREMENT)),
            max_yearly_reward: req
                .max_yearly_reward
                .unwrap_or_else(|| whole_tokens(DEFAULT_MAX_YEARLY_REWARD)),
            crash_fault_tolerance_bp: req
                .crash_fault_tolerance_bp
                .unwrap_or(DEFAULT_CRASH_FAULT_TOLERANCE_BASIS_POINTS),
        }
    }
}

/// Pending-fee lifecycle of a candidate. A requested fee change is
/// quarantined for two elections before it becomes effective.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum FeeState {
    Registered,
    ChangeRequested,
    ChangeAboutToApply,
}

/// A registered validator candidate.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub address: Address,
    pub pub_key: Vec<u8>,
    /// Commission in basis points, taken out of delegator rewards.
    pub fee: u64,
    pub new_fee: u64,
    pub fee_state: FeeState,
    /// Index of the self-delegation escrowing the registration
    /// requirement; zero when registration was whitelisted.
    pub registration_index: u64,
}

/// Bonding lifecycle of a delegation. Every non-`Bonded` state is
/// resolved by the next election.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DelegationState {
    Bonding,
    Bonded,
    Unbonding,
    Redelegating,
}

/// A unit of bonded stake from a delegator to a validator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    pub validator: Address,
    pub delegator: Address,
    pub index: u64,
    /// Active (bonded) stake.
    pub amount: Balance,
    /// Stake movement pending until the next election.
    pub update_amount: Balance,
    pub locktime_tier: LocktimeTier,
    /// Absolute unix time the bond may first be released.
    pub lock_time: u64,
    pub state: DelegationState,
    /// Destination validator of a pending full redelegation.
    pub redelegation_target: Option<Address>,
}

impl Delegation {
    pub fn weighted_amount(&self) -> Balance {
        crate::arith::calculate_fraction(
            self.locktime_tier.bonus_basis_points(),
            self.amount,
        )
    }
}

/// Second storage key of the delegation ledger. The zero-padded index
/// keeps lexicographic key order equal to (delegator, index) order.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct DelegationKey {
    pub delegator: Address,
    pub index: u64,
}

impl DelegationKey {
    pub fn new(delegator: Address, index: u64) -> Self {
        DelegationKey { delegator, index }
    }
}

impl fmt::Display for DelegationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:020}", self.delegator, self.index)
    }
}

impl FromStr for DelegationKey {
    type Err = Box<dyn ruc::RucError>;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(2, '-');
        let delegator = parts
            .next()
            .ok_or(eg!("empty delegation key"))
            .and_then(Address::from_str)?;
        let index = parts
            .next()
            .ok_or(eg!("missing delegation index"))
            .and_then(|p| p.parse::<u64>().c(d!()))?;
        Ok(DelegationKey { delegator, index })
    }
}

/// Per-validator bookkeeping for the current epoch, plus the
/// oracle-granted whitelist shadow stake (which exists independently of
/// candidacy and election).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidatorStatistic {
    pub address: Address,
    pub pub_key: Vec<u8>,
    /// Weighted delegation total at election time.
    pub delegation_total: Balance,
    /// Lifetime rewards minted for this validator's delegators.
    pub distribution_total: Balance,
    pub whitelist_amount: Balance,
    pub whitelist_locktime_tier: LocktimeTier,
    /// Basis points withheld from this validator's rewards.
    pub slash_percentage: u64,
}

/// A member of the consensus validator set.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    pub pub_key: Vec<u8>,
    pub power: u64,
}

/// Monotonic cursor over processed oracle batch items.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RequestBatchTally {
    pub last_block: u64,
    pub last_tx: u64,
    pub last_log: u64,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BatchRequestMeta {
    pub block_number: u64,
    pub tx_index: u64,
    pub log_index: u64,
}

impl BatchRequestMeta {
    /// True when this item lies strictly beyond the tally cursor.
    pub fn is_newer_than(&self, tally: &RequestBatchTally) -> bool {
        (self.block_number, self.tx_index, self.log_index)
            > (tally.last_block, tally.last_tx, tally.last_log)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BatchPayload {
    WhitelistCandidate {
        address: Address,
        amount: Balance,
        /// Raw locktime value from the source chain; out-of-range
        /// collapses to tier 0.
        locktime: u64,
    },
    RemoveWhitelistedCandidate {
        address: Address,
    },
    ChangeWhitelistAmount {
        address: Address,
        amount: Balance,
    },
    ChangeParams(ParamsChange),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ParamsChange {
    ValidatorCount(u64),
    ElectionCycleLength(u64),
    RegistrationRequirement(Balance),
    MaxYearlyReward(Balance),
    OracleAddress(Address),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub payload: BatchPayload,
    pub meta: BatchRequestMeta,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RequestBatch {
    pub batch: Vec<BatchRequest>,
}

/// Rolling yearly mint tally backing the reward cap.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RewardYear {
    pub start: u64,
    pub minted: Balance,
}

/// Aggregate view of every delegation a delegator holds with one
/// validator (or, for `check_all_delegations`, with all of them).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DelegationsSummary {
    pub amount: Balance,
    pub weighted_amount: Balance,
    pub delegations: Vec<Delegation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delegation_key_round_trip() {
        let key = DelegationKey::new(Address::from_public_key(b"pk"), 42);
        let parsed = pnk!(DelegationKey::from_str(&key.to_string()));
        assert_eq!(key, parsed);
    }

    #[test]
    fn delegation_key_order_follows_index() {
        let addr = Address::from_public_key(b"pk");
        let a = DelegationKey::new(addr.clone(), 2).to_string();
        let b = DelegationKey::new(addr, 10).to_string();
        assert!(a < b);
    }

    #[test]
    fn out_of_range_locktime_collapses_to_tier_zero() {
        assert_eq!(LocktimeTier::from_raw_or_zero(10), LocktimeTier::Tier0);
        assert_eq!(LocktimeTier::from_raw_or_zero(3), LocktimeTier::Tier3);
        assert!(LocktimeTier::from_u64(4).is_err());
    }

    #[test]
    fn batch_meta_ordering() {
        let tally = RequestBatchTally {
            last_block: 5,
            last_tx: 2,
            last_log: 1,
        };
        let older = BatchRequestMeta {
            block_number: 5,
            tx_index: 2,
            log_index: 1,
        };
        let newer = BatchRequestMeta {
            block_number: 5,
            tx_index: 2,
            log_index: 2,
        };
        assert!(!older.is_newer_than(&tally));
        assert!(newer.is_newer_than(&tally));
    }
}
