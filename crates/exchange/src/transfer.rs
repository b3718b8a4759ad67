//! Boundary to the component that actually moves assets between accounts.

use {
    alloy::primitives::{Address, U256},
    model::asset::AssetData,
    std::collections::HashMap,
    thiserror::Error,
};

/// A single movement of `amount` units of `asset` from `from` to `to`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Transfer {
    pub asset: AssetData,
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TransferError {
    #[error("{owner} holds {available} of {token} but {needed} is required")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        needed: U256,
        available: U256,
    },
    #[error("balance overflow")]
    Overflow,
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait AssetTransfer: Send {
    /// Applies every transfer of the batch or none of them.
    fn transfer_batch(&mut self, transfers: &[Transfer]) -> Result<(), TransferError>;
}

/// In-memory ERC20 balances keyed by `(token, owner)`.
#[derive(Clone, Debug, Default)]
pub struct Erc20Ledger {
    balances: HashMap<(Address, Address), U256>,
}

impl Erc20Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(
        &mut self,
        token: Address,
        owner: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let balance = self.balances.entry((token, owner)).or_default();
        *balance = balance.checked_add(amount).ok_or(TransferError::Overflow)?;
        Ok(())
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    /// Snapshot of every non-default balance.
    pub fn balances(&self) -> HashMap<(Address, Address), U256> {
        self.balances
            .iter()
            .filter(|(_, balance)| !balance.is_zero())
            .map(|(key, balance)| (*key, *balance))
            .collect()
    }
}

impl AssetTransfer for Erc20Ledger {
    fn transfer_batch(&mut self, transfers: &[Transfer]) -> Result<(), TransferError> {
        let mut scratch = self.balances.clone();
        for transfer in transfers {
            let token = transfer.asset.token();
            let available = scratch
                .get(&(token, transfer.from))
                .copied()
                .unwrap_or_default();
            let remaining = available.checked_sub(transfer.amount).ok_or(
                TransferError::InsufficientBalance {
                    token,
                    owner: transfer.from,
                    needed: transfer.amount,
                    available,
                },
            )?;
            scratch.insert((token, transfer.from), remaining);

            let receiver = scratch.entry((token, transfer.to)).or_default();
            *receiver = receiver
                .checked_add(transfer.amount)
                .ok_or(TransferError::Overflow)?;
        }
        self.balances = scratch;
        Ok(())
    }
}
