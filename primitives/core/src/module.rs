use crate::context::Context;

/// Response to a read-only query routed to a module.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResponseQuery {
    pub code: u32,
    pub log: String,
    pub value: Vec<u8>,
}

impl ResponseQuery {
    pub fn new() -> Self {
        Default::default()
    }
}

/// A change to the consensus validator set emitted at end-of-block.
/// Zero power removes the validator.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidatorUpdate {
    pub pub_key: Vec<u8>,
    pub power: u64,
}

/// AppModule is the standard form for an application module.
pub trait AppModule {
    /// Returns the module's name.
    fn name(&self) -> String;

    /// query_route returns the application module's query response.
    fn query_route(&self, _ctx: Context, _path: Vec<&str>, _data: &[u8]) -> ResponseQuery {
        ResponseQuery::new()
    }

    /// Consensus connection: called at the start of processing a block.
    fn begin_block(&mut self, _ctx: &mut Context) {}

    /// Consensus connection: called at the end of the block. The returned
    /// updates are handed to the consensus layer verbatim.
    fn end_block(&mut self, _ctx: &mut Context, _height: u64) -> Vec<ValidatorUpdate> {
        Vec::new()
    }
}
