use {crate::error::ExchangeError, alloy::primitives::B256, std::collections::HashSet};

/// Set of meta-transaction hashes that have been executed. Entries are never
/// evicted.
#[derive(Debug, Default)]
pub struct ReplayGuard {
    executed: HashSet<B256>,
}

impl ReplayGuard {
    pub fn is_executed(&self, hash: &B256) -> bool {
        self.executed.contains(hash)
    }

    pub fn ensure_not_executed(&self, hash: &B256) -> Result<(), ExchangeError> {
        if self.is_executed(hash) {
            return Err(ExchangeError::InvalidTxHash);
        }
        Ok(())
    }

    /// Returns `false` if the hash was already recorded.
    pub fn record(&mut self, hash: B256) -> bool {
        self.executed.insert(hash)
    }
}
