use crate::context::Context;
use ruc::Result;

/// An action (module function and argument values) that can be executed.
pub trait Executable {
    /// The caller
    type Origin;
    /// The call to execute
    type Call;

    /// Actually execute this action and return the result of it.
    fn execute(
        origin: Option<Self::Origin>,
        call: Self::Call,
        ctx: &Context,
    ) -> Result<ActionResult>;
}

/// Action execution result in the transaction.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ActionResult {
    /// Data is any data returned from message or handler execution.
    pub data: Vec<u8>,
    /// Log contains the log information from message or handler execution.
    pub log: String,
}
