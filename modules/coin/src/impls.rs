use crate::storage::*;
use crate::{App, Config};
use mp_core::{account::Balance, account::CoinAccount, context::Context, crypto::Address};
use mp_traits::token::FungibleToken;
use ruc::*;

impl<C: Config> FungibleToken for App<C> {
    fn balance(ctx: &Context, who: &Address) -> Balance {
        let account: CoinAccount =
            AccountStore::get(ctx.store.clone(), who).unwrap_or_default();
        account.balance
    }

    fn allowance(ctx: &Context, owner: &Address, spender: &Address) -> Balance {
        AllowanceStore::get(ctx.store.clone(), owner, spender).unwrap_or_default()
    }

    fn approve(
        ctx: &Context,
        owner: &Address,
        spender: &Address,
        amount: Balance,
    ) -> Result<()> {
        AllowanceStore::insert(ctx.store.clone(), owner, spender, &amount);
        log::debug!(target: "coin", "{} approved {} to {}", owner, amount, spender);
        Ok(())
    }

    fn transfer(
        ctx: &Context,
        sender: &Address,
        dest: &Address,
        amount: Balance,
    ) -> Result<()> {
        if amount.is_zero() || sender == dest {
            return Ok(());
        }
        let mut from_account: CoinAccount = AccountStore::get(ctx.store.clone(), sender)
            .c(d!("sender does not exist"))?;
        let mut to_account: CoinAccount =
            AccountStore::get(ctx.store.clone(), dest).unwrap_or_default();

        from_account.balance = from_account
            .balance
            .checked_sub(amount)
            .c(d!("insufficient balance"))?;
        to_account.balance = to_account
            .balance
            .checked_add(amount)
            .c(d!("balance overflow"))?;

        AccountStore::insert(ctx.store.clone(), sender, &from_account);
        AccountStore::insert(ctx.store.clone(), dest, &to_account);
        Ok(())
    }

    fn transfer_from(
        ctx: &Context,
        caller: &Address,
        owner: &Address,
        dest: &Address,
        amount: Balance,
    ) -> Result<()> {
        let allowance = Self::allowance(ctx, owner, caller);
        let remaining = allowance
            .checked_sub(amount)
            .c(d!("insufficient allowance"))?;
        Self::transfer(ctx, owner, dest, amount).c(d!())?;
        AllowanceStore::insert(ctx.store.clone(), owner, caller, &remaining);
        Ok(())
    }
}
