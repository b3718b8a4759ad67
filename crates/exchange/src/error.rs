use {crate::transfer::TransferError, model::transaction::CallDataError, thiserror::Error};

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ExchangeError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("order expired")]
    OrderExpired,
    #[error("order is not fillable")]
    OrderUnfillable,
    #[error("authorization failure: {0}")]
    AuthorizationFailure(#[from] Unauthorized),
    #[error("transaction has already been executed")]
    InvalidTxHash,
    #[error("new order epoch must be greater than the current one")]
    InvalidEpoch,
    #[error("transaction failed: {0}")]
    FailedExecution(Box<ExchangeError>),
    #[error("invalid call data: {0}")]
    InvalidCallData(#[from] CallDataError),
    #[error("order can not be filled by the requested amount")]
    IncompleteFill,
    #[error("asset transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

/// The reason an account was not allowed to perform an action.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum Unauthorized {
    #[error("sender is not the order's designated sender")]
    InvalidSender,
    #[error("taker is not the order's designated taker")]
    InvalidTaker,
    #[error("caller is not the order's maker")]
    InvalidMaker,
    #[error("caller is not the exchange administrator")]
    NotAdministrator,
}

impl ExchangeError {
    pub fn failed_execution(inner: ExchangeError) -> Self {
        Self::FailedExecution(Box::new(inner))
    }
}
