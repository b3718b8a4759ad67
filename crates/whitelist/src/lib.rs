//! Gate in front of the exchange that only settles orders between approved
//! makers and takers.
//!
//! Orders meant for the gate name its address as their sender, so the exchange
//! refuses to fill them unless the gate relays the fill.

use {
    alloy::primitives::{Address, Bytes, U256},
    exchange::{AssetTransfer, Exchange, ExchangeError, FillResults, SenderCapability},
    model::{
        order::{OrderData, SignedOrder},
        transaction::{ExchangeCall, MetaTransaction},
    },
    std::collections::HashSet,
    thiserror::Error,
    tracing::instrument,
};

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WhitelistError {
    #[error("maker is not whitelisted")]
    MakerNotWhitelisted,
    #[error("taker is not whitelisted")]
    TakerNotWhitelisted,
    #[error("only the whitelist owner may change entries")]
    NotOwner,
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

#[derive(Debug)]
pub struct Whitelist {
    owner: Address,
    capability: SenderCapability,
    approved: HashSet<Address>,
}

impl Whitelist {
    /// Creates a gate that relays fills through `capability`. The
    /// capability's delegate becomes the gate's address.
    pub fn new(owner: Address, capability: SenderCapability) -> Self {
        Self {
            owner,
            capability,
            approved: Default::default(),
        }
    }

    pub fn from_config(config: &configs::Whitelist, capability: SenderCapability) -> Self {
        Self::new(config.owner, capability)
    }

    /// The sender orders must name to be fillable through this gate.
    pub fn address(&self) -> Address {
        self.capability.delegate()
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.approved.contains(account)
    }

    pub fn update_whitelist_status(
        &mut self,
        account: Address,
        approved: bool,
        caller: Address,
    ) -> Result<(), WhitelistError> {
        if caller != self.owner {
            return Err(WhitelistError::NotOwner);
        }
        let changed = if approved {
            self.approved.insert(account)
        } else {
            self.approved.remove(&account)
        };
        if changed {
            tracing::info!(%account, approved, "whitelist status updated");
        }
        Ok(())
    }

    /// Fills `order` with `caller` as the taker if both the maker and the
    /// taker are whitelisted.
    ///
    /// The fill is submitted as a meta-transaction signed by nobody: the
    /// taker must have approved the gate as a delegate on the exchange.
    /// `salt` makes the transaction unique so the same order can be filled
    /// repeatedly.
    #[instrument(skip_all, fields(maker = %order.maker, taker = %caller))]
    pub fn fill_order_if_whitelisted<T: AssetTransfer>(
        &self,
        exchange: &mut Exchange<T>,
        order: &OrderData,
        taker_asset_fill_amount: U256,
        salt: U256,
        order_signature: Bytes,
        caller: Address,
    ) -> Result<FillResults, WhitelistError> {
        if !self.is_whitelisted(&order.maker) {
            return Err(WhitelistError::MakerNotWhitelisted);
        }
        if !self.is_whitelisted(&caller) {
            return Err(WhitelistError::TakerNotWhitelisted);
        }

        let call = ExchangeCall::FillOrder {
            order: SignedOrder {
                data: *order,
                signature: order_signature,
            },
            taker_asset_fill_amount,
        };
        let transaction = MetaTransaction::new(salt, caller, &call);
        let results = exchange
            .execute_delegated_transaction(&self.capability, &transaction)?
            .unwrap_or_default();
        tracing::debug!(?results, "whitelisted fill");
        Ok(results)
    }
}
