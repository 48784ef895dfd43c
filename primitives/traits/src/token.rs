use mp_core::{account::Balance, context::Context, crypto::Address};
use ruc::Result;

/// The fungible token surface other modules are allowed to touch.
///
/// The token module is the single owner of balances; callers only move
/// funds they hold or funds an owner has approved to them.
pub trait FungibleToken {
    /// The balance of `who`.
    fn balance(ctx: &Context, who: &Address) -> Balance;

    /// The amount `spender` may still pull from `owner`.
    fn allowance(ctx: &Context, owner: &Address, spender: &Address) -> Balance;

    /// Let `spender` pull up to `amount` from `owner`. Overwrites any
    /// previous approval.
    fn approve(ctx: &Context, owner: &Address, spender: &Address, amount: Balance)
        -> Result<()>;

    /// Move `amount` from `sender` to `dest`.
    fn transfer(ctx: &Context, sender: &Address, dest: &Address, amount: Balance)
        -> Result<()>;

    /// Move `amount` from `owner` to `dest` on behalf of `caller`,
    /// consuming `caller`'s allowance.
    fn transfer_from(
        ctx: &Context,
        caller: &Address,
        owner: &Address,
        dest: &Address,
        amount: Balance,
    ) -> Result<()>;
}
