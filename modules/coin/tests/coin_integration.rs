use chainstate::db::MemDB;
use chainstate::state::ChainState;
use module_coin::{Action, App, Config};
use mp_core::account::Balance;
use mp_core::context::Context;
use mp_core::crypto::Address;
use mp_core::transaction::Executable;
use mp_traits::token::FungibleToken;
use parking_lot::RwLock;
use ruc::*;
use std::sync::Arc;

struct Test;
impl Config for Test {}

type Coin = App<Test>;

fn new_context() -> Context {
    let cs = Arc::new(RwLock::new(ChainState::new(
        MemDB::new(),
        "coin_test".to_string(),
    )));
    Context::new(cs)
}

fn addr(seed: u8) -> Address {
    Address::from_public_key(&[seed; 32])
}

fn exec(ctx: &Context, sender: Address, action: Action) -> Result<()> {
    let res = Coin::execute(Some(sender), action, ctx);
    if res.is_ok() {
        ctx.store.write().commit_session();
    } else {
        ctx.store.write().discard_session();
    }
    res.map(|_| ())
}

#[test]
fn transfer_moves_balance() {
    let ctx = new_context();
    let (alice, bob) = (addr(1), addr(2));
    Coin::init_accounts(&ctx, vec![(alice.clone(), Balance::from(1000u64))]);

    pnk!(exec(
        &ctx,
        alice.clone(),
        Action::Transfer {
            dest: bob.clone(),
            amount: Balance::from(300u64),
        }
    ));

    assert_eq!(Coin::balance(&ctx, &alice), Balance::from(700u64));
    assert_eq!(Coin::balance(&ctx, &bob), Balance::from(300u64));

    // overdraft is rejected and leaves no trace
    assert!(exec(
        &ctx,
        alice.clone(),
        Action::Transfer {
            dest: bob.clone(),
            amount: Balance::from(701u64),
        }
    )
    .is_err());
    assert_eq!(Coin::balance(&ctx, &alice), Balance::from(700u64));
    assert_eq!(Coin::balance(&ctx, &bob), Balance::from(300u64));
}

#[test]
fn transfer_from_consumes_allowance() {
    let ctx = new_context();
    let (alice, bob, spender) = (addr(1), addr(2), addr(3));
    Coin::init_accounts(&ctx, vec![(alice.clone(), Balance::from(1000u64))]);

    // no approval yet
    assert!(exec(
        &ctx,
        spender.clone(),
        Action::TransferFrom {
            owner: alice.clone(),
            dest: bob.clone(),
            amount: Balance::from(100u64),
        }
    )
    .is_err());

    pnk!(exec(
        &ctx,
        alice.clone(),
        Action::Approve {
            spender: spender.clone(),
            amount: Balance::from(400u64),
        }
    ));
    assert_eq!(
        Coin::allowance(&ctx, &alice, &spender),
        Balance::from(400u64)
    );

    pnk!(exec(
        &ctx,
        spender.clone(),
        Action::TransferFrom {
            owner: alice.clone(),
            dest: bob.clone(),
            amount: Balance::from(250u64),
        }
    ));
    assert_eq!(Coin::balance(&ctx, &bob), Balance::from(250u64));
    assert_eq!(
        Coin::allowance(&ctx, &alice, &spender),
        Balance::from(150u64)
    );

    // exceeding the remaining approval fails
    assert!(exec(
        &ctx,
        spender,
        Action::TransferFrom {
            owner: alice,
            dest: bob,
            amount: Balance::from(151u64),
        }
    )
    .is_err());
}
