use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Monetary quantity in minimal base units (18 decimals).
/// Non-negative by construction.
pub type Balance = U256;

/// On-chain account of the fungible token.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CoinAccount {
    pub balance: Balance,
}
