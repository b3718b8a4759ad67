//! Mutable exchange state that outlives single actions.

use {
    alloy::primitives::{Address, B256, U256},
    std::collections::{HashMap, HashSet},
};

#[derive(Debug, Default)]
pub struct OrderState {
    /// Cumulative taker asset amount filled per order hash.
    filled: HashMap<B256, U256>,
    cancelled: HashSet<B256>,
    /// Orders of a maker with a salt at or below the epoch are cancelled.
    epochs: HashMap<Address, U256>,
    pre_signed: HashSet<(B256, Address)>,
    /// `(signer, delegate)` pairs the signer has consented to.
    delegate_approvals: HashSet<(Address, Address)>,
}

impl OrderState {
    pub fn filled(&self, order_hash: &B256) -> U256 {
        self.filled.get(order_hash).copied().unwrap_or_default()
    }

    /// Adds to the filled amount. Callers bound `amount` by the remaining
    /// amount, so the sum never exceeds the order's taker amount.
    pub fn add_filled(&mut self, order_hash: B256, amount: U256) {
        let filled = self.filled.entry(order_hash).or_default();
        *filled = filled.saturating_add(amount);
    }

    pub fn is_cancelled(&self, order_hash: &B256) -> bool {
        self.cancelled.contains(order_hash)
    }

    /// Returns `false` if the order was already cancelled.
    pub fn cancel(&mut self, order_hash: B256) -> bool {
        self.cancelled.insert(order_hash)
    }

    pub fn epoch(&self, maker: &Address) -> Option<U256> {
        self.epochs.get(maker).copied()
    }

    pub fn is_epoch_cancelled(&self, maker: &Address, salt: U256) -> bool {
        self.epoch(maker).is_some_and(|epoch| salt <= epoch)
    }

    /// Raises the maker's epoch. Returns `false` and leaves the epoch as is
    /// unless `epoch` is strictly greater than the current one.
    pub fn advance_epoch(&mut self, maker: Address, epoch: U256) -> bool {
        match self.epoch(&maker) {
            Some(current) if epoch <= current => false,
            _ => {
                self.epochs.insert(maker, epoch);
                true
            }
        }
    }

    pub fn pre_sign(&mut self, hash: B256, signer: Address) {
        self.pre_signed.insert((hash, signer));
    }

    pub fn is_pre_signed(&self, hash: &B256, signer: &Address) -> bool {
        self.pre_signed.contains(&(*hash, *signer))
    }

    pub fn set_delegate_approval(&mut self, signer: Address, delegate: Address, approved: bool) {
        if approved {
            self.delegate_approvals.insert((signer, delegate));
        } else {
            self.delegate_approvals.remove(&(signer, delegate));
        }
    }

    pub fn is_delegate_approved(&self, signer: &Address, delegate: &Address) -> bool {
        self.delegate_approvals.contains(&(*signer, *delegate))
    }
}
