use alloy::primitives::Address;

/// Accounts on whose behalf one exchange action runs.
///
/// A value is created for every call and handed down by reference, so the
/// signer of a meta-transaction is only ever visible to the action it
/// carries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExecutionContext {
    /// The account that submitted the action.
    pub sender: Address,
    /// The meta-transaction signer, if the action is relayed.
    pub signer: Option<Address>,
}

impl ExecutionContext {
    pub fn direct(sender: Address) -> Self {
        Self {
            sender,
            signer: None,
        }
    }

    pub fn relayed(sender: Address, signer: Address) -> Self {
        Self {
            sender,
            signer: Some(signer),
        }
    }

    /// The account the action is performed as.
    pub fn current_address(&self) -> Address {
        self.signer.unwrap_or(self.sender)
    }
}
