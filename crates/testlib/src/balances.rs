use {
    alloy::primitives::{Address, I256, U256},
    std::collections::{HashMap, HashSet},
};

/// Signed balance change per `(token, owner)`.
pub type BalanceChanges = HashMap<(Address, Address), I256>;

/// Difference between two ledger snapshots. Unchanged balances are omitted.
pub fn balance_changes(
    before: &HashMap<(Address, Address), U256>,
    after: &HashMap<(Address, Address), U256>,
) -> BalanceChanges {
    let keys: HashSet<_> = before.keys().chain(after.keys()).copied().collect();
    keys.into_iter()
        .filter_map(|key| {
            let old = signed(before.get(&key).copied().unwrap_or_default());
            let new = signed(after.get(&key).copied().unwrap_or_default());
            (old != new).then(|| (key, new - old))
        })
        .collect()
}

fn signed(value: U256) -> I256 {
    I256::try_from(value).expect("test balances fit into I256")
}
