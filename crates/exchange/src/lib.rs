//! Settlement of signed orders and execution of signed meta-transactions.

pub mod clock;
pub mod context;
pub mod deployment;
pub mod error;
mod exchange;
pub mod executor;
pub mod fill;
pub mod math;
pub mod replay;
pub mod signature;
pub mod state;
pub mod transfer;

pub use {
    clock::{Clock, SystemClock},
    context::ExecutionContext,
    deployment::Deployment,
    error::{ExchangeError, Unauthorized},
    exchange::Exchange,
    executor::SenderCapability,
    fill::{FillResults, OrderInfo, OrderStatus},
    transfer::{AssetTransfer, Erc20Ledger, Transfer, TransferError},
};
