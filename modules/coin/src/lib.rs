mod impls;

use mp_core::{
    account::Balance,
    context::Context,
    crypto::Address,
    module::{AppModule, ResponseQuery},
    transaction::{ActionResult, Executable},
};
use mp_traits::token::FungibleToken;
use ruc::*;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

pub const MODULE_NAME: &str = "coin";

pub trait Config {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Transfer { dest: Address, amount: Balance },
    Approve { spender: Address, amount: Balance },
    TransferFrom { owner: Address, dest: Address, amount: Balance },
}

mod storage {
    use mp_core::{account::Balance, account::CoinAccount, crypto::Address};
    use mp_storage::*;

    // Store account information under all account addresses
    generate_storage!(Coin, AccountStore => Map<Address, CoinAccount>);
    // Store the remaining owner -> spender approvals
    generate_storage!(Coin, AllowanceStore => DoubleMap<Address, Address, Balance>);
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

    /// Seed the initial account balances. Used once at genesis.
    pub fn init_accounts(ctx: &Context, accounts: Vec<(Address, Balance)>) {
        for (owner, balance) in accounts.into_iter() {
            storage::AccountStore::insert(
                ctx.store.clone(),
                &owner,
                &mp_core::account::CoinAccount { balance },
            );
        }
    }
}

impl<C: Config> Default for App<C> {
    fn default() -> Self {
        Self::new()
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
            resp.log = String::from("coin: invalid query path");
            return resp;
        }
        match path[0] {
            "balance" => {
                let who = serde_json::from_slice::<Address>(data);
                if who.is_err() {
                    resp.code = 1;
                    resp.log = String::from("coin: query balance with invalid params");
                    return resp;
                }
                let balance = Self::balance(&ctx, &who.unwrap());
                resp.value = serde_json::to_vec(&balance).unwrap_or_default();
                resp
            }
            _ => resp,
        }
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
            Action::Transfer { dest, amount } => {
                Self::transfer(ctx, &sender, &dest, amount).c(d!())?;
                Ok(ActionResult::default())
            }
            Action::Approve { spender, amount } => {
                Self::approve(ctx, &sender, &spender, amount).c(d!())?;
                Ok(ActionResult::default())
            }
            Action::TransferFrom { owner, dest, amount } => {
                Self::transfer_from(ctx, &sender, &owner, &dest, amount).c(d!())?;
                Ok(ActionResult::default())
            }
        }
    }
}
