use chainstate::{
    db::MemDB,
    state::{ChainState, State},
};
pub use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
pub use std::sync::Arc;

pub type Store = State<MemDB>;

/// Header of the block currently being executed, as provided by the
/// consensus host. `time` is the block timestamp in unix seconds;
/// modules never read a wall clock.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: u64,
    pub time: u64,
}

#[derive(Clone)]
pub struct Context {
    pub store: Arc<RwLock<Store>>,
    pub header: BlockHeader,
    pub chain_id: String,
}

impl Context {
    pub fn new(cs: Arc<RwLock<ChainState<MemDB>>>) -> Self {
        Context {
            store: Arc::new(RwLock::new(Store::new(cs))),
            header: Default::default(),
            chain_id: "".to_string(),
        }
    }
}

impl Context {
    pub fn commit_store(&self) -> Arc<RwLock<Store>> {
        self.store.clone()
    }

    pub fn block_header(&self) -> BlockHeader {
        self.header.clone()
    }

    pub fn block_height(&self) -> u64 {
        self.header.height
    }

    pub fn block_time(&self) -> u64 {
        self.header.time
    }

    pub fn chain_id(&self) -> String {
        self.chain_id.clone()
    }
}
