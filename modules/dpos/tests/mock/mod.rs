//!
//! Test harness wiring the dpos module to the coin module over a fresh
//! in-memory chain state, with the session commit/discard semantics the
//! real block executor applies around every transaction.
//!

#![allow(dead_code)]

use chainstate::db::MemDB;
use chainstate::state::ChainState;
use module_dpos::types::InitRequest;
use mp_core::account::Balance;
use mp_core::context::Context;
use mp_core::crypto::Address;
use mp_core::transaction::Executable;
use parking_lot::RwLock;
use ruc::*;
use std::sync::Arc;

pub struct TestConfig;

impl module_coin::Config for TestConfig {}

impl module_dpos::Config for TestConfig {
    type Coin = module_coin::App<TestConfig>;
}

pub type Coin = module_coin::App<TestConfig>;
pub type Dpos = module_dpos::App<TestConfig>;

pub const START_TIME: u64 = 100_000;

pub struct TestApp {
    pub ctx: Context,
}

impl TestApp {
    pub fn new() -> Self {
        let chain = Arc::new(RwLock::new(ChainState::new(
            MemDB::new(),
            "dpos_test".to_string(),
        )));
        let mut ctx = Context::new(chain);
        ctx.chain_id = "chain".to_string();
        ctx.header.height = 1;
        ctx.header.time = START_TIME;
        TestApp { ctx }
    }

    pub fn now(&self) -> u64 {
        self.ctx.header.time
    }

    pub fn set_time(&mut self, time: u64) {
        self.ctx.header.time = time;
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.ctx.header.time += seconds;
        self.ctx.header.height += 1;
    }

    /// Seed coin balances, committed like a genesis block.
    pub fn fund(&self, accounts: Vec<(Address, Balance)>) {
        Coin::init_accounts(&self.ctx, accounts);
        self.ctx.store.write().commit_session();
    }

    pub fn exec(&self, sender: &Address, action: module_dpos::Action) -> Result<()> {
        let res = Dpos::execute(Some(sender.clone()), action, &self.ctx);
        self.seal(res.is_ok());
        res.map(|_| ())
    }

    pub fn exec_coin(&self, sender: &Address, action: module_coin::Action) -> Result<()> {
        let res = Coin::execute(Some(sender.clone()), action, &self.ctx);
        self.seal(res.is_ok());
        res.map(|_| ())
    }

    fn seal(&self, ok: bool) {
        let mut store = self.ctx.store.write();
        if ok {
            store.commit_session();
        } else {
            store.discard_session();
        }
    }

    pub fn init_dpos(&self, sender: &Address, request: InitRequest) -> Result<()> {
        self.exec(sender, module_dpos::Action::Init(request))
    }

    /// Approve the dpos escrow account to pull `amount` from `owner`.
    pub fn approve(&self, owner: &Address, amount: Balance) -> Result<()> {
        self.exec_coin(
            owner,
            module_coin::Action::Approve {
                spender: module_dpos::DPOS_MODULE_ADDRESS.clone(),
                amount,
            },
        )
    }

    pub fn elect(&self, sender: &Address) -> Result<()> {
        self.exec(sender, module_dpos::Action::Elect)
    }
}

/// Deterministic key material: a synthetic public key and the account
/// address derived from it.
pub fn keypair(seed: u8) -> (Vec<u8>, Address) {
    let pub_key = vec![seed; 32];
    let address = Address::from_public_key(&pub_key);
    (pub_key, address)
}
