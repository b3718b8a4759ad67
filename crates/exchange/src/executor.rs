//! Execution of signed meta-transactions on behalf of their signers.

use {
    crate::{
        context::ExecutionContext,
        error::{ExchangeError, Unauthorized},
        exchange::Exchange,
        fill::FillResults,
        transfer::AssetTransfer,
    },
    alloy::primitives::{Address, B256},
    model::transaction::{ExchangeCall, MetaTransaction, SignedTransaction},
    tracing::instrument,
};

/// Proof that the exchange administrator allowed `delegate` to submit
/// meta-transactions without their signatures for signers that approved it.
///
/// Only [`Exchange::authorize_delegate`] creates values of this type.
#[derive(Debug, Eq, PartialEq)]
pub struct SenderCapability {
    exchange: Address,
    delegate: Address,
}

impl SenderCapability {
    pub fn delegate(&self) -> Address {
        self.delegate
    }
}

impl<T: AssetTransfer> Exchange<T> {
    /// Executes the call embedded in `transaction` as its signer with
    /// `caller` as the submitting sender.
    ///
    /// Once the signature checks out, the transaction hash is consumed even
    /// if the embedded call fails.
    #[instrument(skip_all, fields(signer = %transaction.transaction.signer, %caller))]
    pub fn execute_transaction(
        &mut self,
        transaction: &SignedTransaction,
        caller: Address,
    ) -> Result<Option<FillResults>, ExchangeError> {
        let hash = self.transaction_hash(&transaction.transaction);
        self.replay.ensure_not_executed(&hash)?;
        if !self.is_valid_signature(
            &hash,
            transaction.transaction.signer,
            &transaction.signature,
        ) {
            tracing::debug!(tx_hash = %hash, "invalid transaction signature");
            return Err(ExchangeError::InvalidSignature);
        }
        self.execute_verified(hash, &transaction.transaction, caller)
    }

    /// Executes `transaction` submitted by the capability's delegate. Instead
    /// of a signature the signer must have approved the delegate.
    #[instrument(skip_all, fields(signer = %transaction.signer, delegate = %capability.delegate))]
    pub fn execute_delegated_transaction(
        &mut self,
        capability: &SenderCapability,
        transaction: &MetaTransaction,
    ) -> Result<Option<FillResults>, ExchangeError> {
        let hash = self.transaction_hash(transaction);
        self.replay.ensure_not_executed(&hash)?;
        let authorized = capability.exchange == self.deployment.verifying_contract
            && self.delegates.contains(&capability.delegate);
        if !authorized
            || !self
                .state
                .is_delegate_approved(&transaction.signer, &capability.delegate)
        {
            tracing::debug!(tx_hash = %hash, authorized, "delegate not approved");
            return Err(ExchangeError::InvalidSignature);
        }
        self.execute_verified(hash, transaction, capability.delegate)
    }

    /// Allows `delegate` to submit transactions for signers that approve it.
    pub fn authorize_delegate(
        &mut self,
        delegate: Address,
        caller: Address,
    ) -> Result<SenderCapability, ExchangeError> {
        self.ensure_administrator(caller)?;
        tracing::info!(%delegate, "delegate authorized");
        self.delegates.insert(delegate);
        Ok(SenderCapability {
            exchange: self.deployment.verifying_contract,
            delegate,
        })
    }

    /// Invalidates every capability issued for `delegate`.
    pub fn revoke_delegate(
        &mut self,
        delegate: Address,
        caller: Address,
    ) -> Result<(), ExchangeError> {
        self.ensure_administrator(caller)?;
        if self.delegates.remove(&delegate) {
            tracing::info!(%delegate, "delegate revoked");
        }
        Ok(())
    }

    pub fn is_delegate_authorized(&self, delegate: &Address) -> bool {
        self.delegates.contains(delegate)
    }

    /// Records whether `caller` consents to `delegate` submitting
    /// transactions in their name.
    pub fn set_delegate_approval(&mut self, delegate: Address, approved: bool, caller: Address) {
        tracing::debug!(signer = %caller, %delegate, approved, "delegate approval");
        self.state.set_delegate_approval(caller, delegate, approved);
    }

    pub fn is_delegate_approved(&self, signer: &Address, delegate: &Address) -> bool {
        self.state.is_delegate_approved(signer, delegate)
    }

    fn ensure_administrator(&self, caller: Address) -> Result<(), ExchangeError> {
        if caller != self.deployment.administrator {
            return Err(Unauthorized::NotAdministrator.into());
        }
        Ok(())
    }

    fn execute_verified(
        &mut self,
        hash: B256,
        transaction: &MetaTransaction,
        sender: Address,
    ) -> Result<Option<FillResults>, ExchangeError> {
        let ctx = ExecutionContext::relayed(sender, transaction.signer);
        let result = transaction
            .call()
            .map_err(ExchangeError::from)
            .and_then(|call| self.dispatch(&ctx, call));
        self.replay.record(hash);

        match result {
            Ok(output) => {
                tracing::info!(tx_hash = %hash, "transaction executed");
                Ok(output)
            }
            Err(err) => {
                tracing::debug!(tx_hash = %hash, ?err, "transaction failed");
                Err(ExchangeError::failed_execution(err))
            }
        }
    }

    fn dispatch(
        &mut self,
        ctx: &ExecutionContext,
        call: ExchangeCall,
    ) -> Result<Option<FillResults>, ExchangeError> {
        tracing::debug!(call = call.name(), "dispatching");
        match call {
            ExchangeCall::FillOrder {
                order,
                taker_asset_fill_amount,
            } => self
                .fill_order_as(ctx, &order, taker_asset_fill_amount)
                .map(Some),
            ExchangeCall::FillOrKillOrder {
                order,
                taker_asset_fill_amount,
            } => self
                .fill_or_kill_order_as(ctx, &order, taker_asset_fill_amount)
                .map(Some),
            ExchangeCall::CancelOrder { order } => {
                self.cancel_order_as(ctx, &order).map(|()| None)
            }
            ExchangeCall::CancelOrdersUpTo { target_order_epoch } => self
                .cancel_orders_up_to_as(ctx, target_order_epoch)
                .map(|()| None),
        }
    }
}
