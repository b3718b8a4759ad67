//! Helpers shared by the integration tests of the exchange and the
//! whitelist gate.

pub mod accounts;
pub mod balances;
pub mod clock;
pub mod factories;

pub use {
    accounts::{AccountGenerator, TestAccount},
    balances::{BalanceChanges, balance_changes},
    clock::FixedClock,
    factories::{OrderFactory, TransactionFactory},
};
