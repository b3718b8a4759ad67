use {
    crate::{
        clock::{Clock, SystemClock},
        context::ExecutionContext,
        deployment::Deployment,
        error::{ExchangeError, Unauthorized},
        fill::{FillResults, OrderInfo, OrderStatus},
        replay::ReplayGuard,
        signature,
        state::OrderState,
        transfer::AssetTransfer,
    },
    alloy::primitives::{Address, B256, U256},
    model::{
        DomainSeparator,
        order::{OrderData, SignedOrder},
        transaction::MetaTransaction,
    },
    std::collections::HashSet,
    tracing::instrument,
};

/// Settles signed orders between makers and takers.
///
/// Every action either succeeds as a whole or fails without changing any
/// state: checks run first, then the transfer batch, and fill state is only
/// updated once the batch went through.
pub struct Exchange<T> {
    pub(crate) deployment: Deployment,
    pub(crate) domain: DomainSeparator,
    pub(crate) state: OrderState,
    pub(crate) replay: ReplayGuard,
    /// Accounts the administrator allowed to submit transactions for
    /// consenting signers.
    pub(crate) delegates: HashSet<Address>,
    transfers: T,
    clock: Box<dyn Clock>,
}

impl<T: AssetTransfer> Exchange<T> {
    pub fn new(deployment: Deployment, transfers: T) -> Self {
        Self {
            domain: deployment.domain(),
            deployment,
            state: Default::default(),
            replay: Default::default(),
            delegates: Default::default(),
            transfers,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn domain(&self) -> &DomainSeparator {
        &self.domain
    }

    pub fn transfers(&self) -> &T {
        &self.transfers
    }

    pub fn transfers_mut(&mut self) -> &mut T {
        &mut self.transfers
    }

    /// Fills up to `taker_asset_fill_amount` of the order's taker asset with
    /// `caller` as the taker.
    pub fn fill_order(
        &mut self,
        order: &SignedOrder,
        taker_asset_fill_amount: U256,
        caller: Address,
    ) -> Result<FillResults, ExchangeError> {
        self.fill_order_as(
            &ExecutionContext::direct(caller),
            order,
            taker_asset_fill_amount,
        )
    }

    /// Like [`Self::fill_order`] but fails unless exactly
    /// `taker_asset_fill_amount` can be filled.
    pub fn fill_or_kill_order(
        &mut self,
        order: &SignedOrder,
        taker_asset_fill_amount: U256,
        caller: Address,
    ) -> Result<FillResults, ExchangeError> {
        self.fill_or_kill_order_as(
            &ExecutionContext::direct(caller),
            order,
            taker_asset_fill_amount,
        )
    }

    pub fn cancel_order(
        &mut self,
        order: &OrderData,
        caller: Address,
    ) -> Result<(), ExchangeError> {
        self.cancel_order_as(&ExecutionContext::direct(caller), order)
    }

    /// Cancels all orders or, if `caller` may not cancel one of them, none.
    #[instrument(skip_all, fields(%caller, orders = orders.len()))]
    pub fn batch_cancel_orders(
        &mut self,
        orders: &[OrderData],
        caller: Address,
    ) -> Result<(), ExchangeError> {
        let ctx = ExecutionContext::direct(caller);
        let hashes = orders
            .iter()
            .map(|order| self.assert_cancellable(&ctx, order))
            .collect::<Result<Vec<_>, _>>()?;
        for hash in hashes {
            self.state.cancel(hash);
        }
        tracing::info!("orders cancelled");
        Ok(())
    }

    /// Cancels every order of `caller` with a salt at or below
    /// `target_order_epoch`.
    pub fn cancel_orders_up_to(
        &mut self,
        target_order_epoch: U256,
        caller: Address,
    ) -> Result<(), ExchangeError> {
        self.cancel_orders_up_to_as(&ExecutionContext::direct(caller), target_order_epoch)
    }

    /// Approves `hash` on behalf of `caller`, making the pre-signed signature
    /// scheme valid for this pair.
    pub fn pre_sign(&mut self, hash: B256, caller: Address) {
        tracing::debug!(%hash, signer = %caller, "pre-signed");
        self.state.pre_sign(hash, caller);
    }

    pub fn order_hash(&self, order: &OrderData) -> B256 {
        order.hash(&self.domain)
    }

    pub fn transaction_hash(&self, transaction: &MetaTransaction) -> B256 {
        transaction.hash(&self.domain)
    }

    pub fn order_info(&self, order: &OrderData) -> OrderInfo {
        let hash = self.order_hash(order);
        let filled = self.state.filled(&hash);
        let status = if order.maker_asset_amount.is_zero() {
            OrderStatus::InvalidMakerAssetAmount
        } else if order.taker_asset_amount.is_zero() {
            OrderStatus::InvalidTakerAssetAmount
        } else if order.is_expired(self.clock.now()) {
            OrderStatus::Expired
        } else if self.state.is_cancelled(&hash)
            || self.state.is_epoch_cancelled(&order.maker, order.salt)
        {
            OrderStatus::Cancelled
        } else if filled >= order.taker_asset_amount {
            OrderStatus::FullyFilled
        } else {
            OrderStatus::Fillable
        };
        OrderInfo {
            status,
            hash,
            taker_asset_filled_amount: filled,
        }
    }

    pub fn filled(&self, order_hash: &B256) -> U256 {
        self.state.filled(order_hash)
    }

    pub fn is_cancelled(&self, order_hash: &B256) -> bool {
        self.state.is_cancelled(order_hash)
    }

    pub fn order_epoch(&self, maker: &Address) -> Option<U256> {
        self.state.epoch(maker)
    }

    pub fn is_transaction_executed(&self, transaction_hash: &B256) -> bool {
        self.replay.is_executed(transaction_hash)
    }

    pub fn is_valid_signature(&self, hash: &B256, signer: Address, signature: &[u8]) -> bool {
        signature::is_valid(&self.state, hash, signer, signature)
    }

    #[instrument(
        skip_all,
        fields(maker = %order.data.maker, sender = %ctx.sender, signer = ?ctx.signer)
    )]
    pub(crate) fn fill_order_as(
        &mut self,
        ctx: &ExecutionContext,
        order: &SignedOrder,
        taker_asset_fill_amount: U256,
    ) -> Result<FillResults, ExchangeError> {
        let (info, results) = self.prepare_fill(ctx, order, taker_asset_fill_amount)?;
        self.settle(ctx, &order.data, &info, &results)?;
        Ok(results)
    }

    #[instrument(
        skip_all,
        fields(maker = %order.data.maker, sender = %ctx.sender, signer = ?ctx.signer)
    )]
    pub(crate) fn fill_or_kill_order_as(
        &mut self,
        ctx: &ExecutionContext,
        order: &SignedOrder,
        taker_asset_fill_amount: U256,
    ) -> Result<FillResults, ExchangeError> {
        let (info, results) = self.prepare_fill(ctx, order, taker_asset_fill_amount)?;
        if results.taker_asset_filled_amount != taker_asset_fill_amount {
            tracing::debug!(
                order_hash = %info.hash,
                requested = %taker_asset_fill_amount,
                fillable = %results.taker_asset_filled_amount,
                "incomplete fill"
            );
            return Err(ExchangeError::IncompleteFill);
        }
        self.settle(ctx, &order.data, &info, &results)?;
        Ok(results)
    }

    #[instrument(
        skip_all,
        fields(maker = %order.maker, sender = %ctx.sender, signer = ?ctx.signer)
    )]
    pub(crate) fn cancel_order_as(
        &mut self,
        ctx: &ExecutionContext,
        order: &OrderData,
    ) -> Result<(), ExchangeError> {
        let hash = self.assert_cancellable(ctx, order)?;
        if self.state.cancel(hash) {
            tracing::info!(order_hash = %hash, "order cancelled");
        }
        Ok(())
    }

    #[instrument(skip_all, fields(maker = %ctx.current_address(), %target_order_epoch))]
    pub(crate) fn cancel_orders_up_to_as(
        &mut self,
        ctx: &ExecutionContext,
        target_order_epoch: U256,
    ) -> Result<(), ExchangeError> {
        let maker = ctx.current_address();
        if !self.state.advance_epoch(maker, target_order_epoch) {
            tracing::debug!(current = ?self.state.epoch(&maker), "epoch not increased");
            return Err(ExchangeError::InvalidEpoch);
        }
        tracing::info!("order epoch raised");
        Ok(())
    }

    /// Runs every check of a fill and computes its amounts without changing
    /// any state.
    fn prepare_fill(
        &self,
        ctx: &ExecutionContext,
        order: &SignedOrder,
        taker_asset_fill_amount: U256,
    ) -> Result<(OrderInfo, FillResults), ExchangeError> {
        let info = self.order_info(&order.data);
        match info.status {
            OrderStatus::Fillable => (),
            OrderStatus::FullyFilled if taker_asset_fill_amount.is_zero() => (),
            OrderStatus::Expired => return Err(ExchangeError::OrderExpired),
            status => {
                tracing::debug!(order_hash = %info.hash, ?status, "order not fillable");
                return Err(ExchangeError::OrderUnfillable);
            }
        }

        if order.data.has_sender_restriction() && order.data.sender != ctx.sender {
            return Err(Unauthorized::InvalidSender.into());
        }
        let taker = ctx.current_address();
        if order.data.has_taker_restriction() && order.data.taker != taker {
            return Err(Unauthorized::InvalidTaker.into());
        }
        if !self.is_valid_signature(&info.hash, order.data.maker, &order.signature) {
            tracing::debug!(order_hash = %info.hash, "invalid order signature");
            return Err(ExchangeError::InvalidSignature);
        }

        let results = FillResults::compute(
            &order.data,
            info.taker_asset_filled_amount,
            taker_asset_fill_amount,
        );
        Ok((info, results))
    }

    fn settle(
        &mut self,
        ctx: &ExecutionContext,
        order: &OrderData,
        info: &OrderInfo,
        results: &FillResults,
    ) -> Result<(), ExchangeError> {
        if results.is_empty() {
            tracing::debug!(order_hash = %info.hash, "nothing to fill");
            return Ok(());
        }

        let taker = ctx.current_address();
        let transfers = results.transfers(order, taker, self.deployment.fee_asset());
        if let Err(err) = self.transfers.transfer_batch(&transfers) {
            tracing::debug!(order_hash = %info.hash, ?err, "transfer failed");
            return Err(err.into());
        }
        self.state.add_filled(info.hash, results.taker_asset_filled_amount);

        tracing::info!(
            order_hash = %info.hash,
            %taker,
            taker_filled = %results.taker_asset_filled_amount,
            maker_filled = %results.maker_asset_filled_amount,
            "order filled"
        );
        Ok(())
    }

    fn assert_cancellable(
        &self,
        ctx: &ExecutionContext,
        order: &OrderData,
    ) -> Result<B256, ExchangeError> {
        if order.maker != ctx.current_address() {
            return Err(Unauthorized::InvalidMaker.into());
        }
        if order.has_sender_restriction() && order.sender != ctx.sender {
            return Err(Unauthorized::InvalidSender.into());
        }
        Ok(self.order_hash(order))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::transfer::{Erc20Ledger, MockAssetTransfer, Transfer, TransferError},
        alloy::signers::local::PrivateKeySigner,
        model::{
            asset::AssetData,
            order::OrderBuilder,
            signature::{EcdsaSigningScheme, Signature},
        },
    };

    const NOW: u64 = 1_000_000;
    const MAKER_TOKEN: Address = Address::repeat_byte(0xaa);
    const TAKER_TOKEN: Address = Address::repeat_byte(0xbb);
    const FEE_TOKEN: Address = Address::repeat_byte(0xcc);
    const TAKER: Address = Address::repeat_byte(2);
    const FEE_RECIPIENT: Address = Address::repeat_byte(3);

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            self.0
        }
    }

    fn deployment() -> Deployment {
        Deployment {
            verifying_contract: Address::repeat_byte(0xee),
            administrator: Address::repeat_byte(0xad),
            fee_token: FEE_TOKEN,
        }
    }

    fn maker() -> PrivateKeySigner {
        PrivateKeySigner::from_slice(&[0x44; 32]).unwrap()
    }

    fn builder() -> OrderBuilder {
        OrderBuilder::default()
            .with_fee_recipient(FEE_RECIPIENT)
            .with_maker_asset(MAKER_TOKEN)
            .with_taker_asset(TAKER_TOKEN)
            .with_maker_asset_amount(U256::from(200))
            .with_taker_asset_amount(U256::from(100))
            .with_maker_fee(U256::from(10))
            .with_taker_fee(U256::from(10))
            .with_expiration(U256::from(NOW + 3600))
            .with_salt(U256::from(1))
    }

    fn sign(builder: OrderBuilder) -> SignedOrder {
        builder
            .sign_with(EcdsaSigningScheme::Eip712, &deployment().domain(), &maker())
            .unwrap()
            .build()
    }

    fn funded_exchange() -> Exchange<Erc20Ledger> {
        let maker = maker().address();
        let mut ledger = Erc20Ledger::new();
        for (token, owner) in [
            (MAKER_TOKEN, maker),
            (FEE_TOKEN, maker),
            (TAKER_TOKEN, TAKER),
            (FEE_TOKEN, TAKER),
        ] {
            ledger.mint(token, owner, U256::from(1_000)).unwrap();
        }
        Exchange::new(deployment(), ledger).with_clock(FixedClock(NOW))
    }

    fn mock_exchange(transfers: MockAssetTransfer) -> Exchange<MockAssetTransfer> {
        Exchange::new(deployment(), transfers).with_clock(FixedClock(NOW))
    }

    #[test]
    fn fill_requests_exact_transfer_batch() {
        let order = sign(builder());
        let maker = order.data.maker;
        let expected = vec![
            Transfer {
                asset: AssetData::erc20(MAKER_TOKEN),
                from: maker,
                to: TAKER,
                amount: U256::from(100),
            },
            Transfer {
                asset: AssetData::erc20(TAKER_TOKEN),
                from: TAKER,
                to: maker,
                amount: U256::from(50),
            },
            Transfer {
                asset: AssetData::erc20(FEE_TOKEN),
                from: maker,
                to: FEE_RECIPIENT,
                amount: U256::from(5),
            },
            Transfer {
                asset: AssetData::erc20(FEE_TOKEN),
                from: TAKER,
                to: FEE_RECIPIENT,
                amount: U256::from(5),
            },
        ];
        let mut transfers = MockAssetTransfer::new();
        transfers
            .expect_transfer_batch()
            .withf(move |batch| batch.to_vec() == expected)
            .times(1)
            .returning(|_| Ok(()));
        let mut exchange = mock_exchange(transfers);

        let results = exchange.fill_order(&order, U256::from(50), TAKER).unwrap();
        assert_eq!(results.taker_asset_filled_amount, U256::from(50));
        assert_eq!(
            exchange.filled(&exchange.order_hash(&order.data)),
            U256::from(50)
        );
    }

    #[test]
    fn failed_transfer_leaves_state_untouched() {
        let order = sign(builder());
        let mut transfers = MockAssetTransfer::new();
        transfers
            .expect_transfer_batch()
            .times(1)
            .returning(|_| Err(TransferError::Overflow));
        let mut exchange = mock_exchange(transfers);

        assert_eq!(
            exchange.fill_order(&order, U256::from(50), TAKER),
            Err(ExchangeError::TransferFailed(TransferError::Overflow))
        );
        assert_eq!(
            exchange.filled(&exchange.order_hash(&order.data)),
            U256::ZERO
        );
    }

    #[test]
    fn zero_fill_is_a_noop() {
        let order = sign(builder());
        let mut transfers = MockAssetTransfer::new();
        transfers.expect_transfer_batch().never();
        let mut exchange = mock_exchange(transfers);

        assert_eq!(
            exchange.fill_order(&order, U256::ZERO, TAKER),
            Ok(FillResults::default())
        );
    }

    #[test]
    fn precondition_order() {
        let mut transfers = MockAssetTransfer::new();
        transfers.expect_transfer_batch().never();
        let mut exchange = mock_exchange(transfers);

        // Invalid amounts take precedence over expiry.
        let order = sign(
            builder()
                .with_maker_asset_amount(U256::ZERO)
                .with_expiration(U256::ZERO),
        );
        assert_eq!(
            exchange.fill_order(&order, U256::from(1), TAKER),
            Err(ExchangeError::OrderUnfillable)
        );

        // Expiry takes precedence over cancellation.
        let order = sign(builder().with_expiration(U256::from(NOW)));
        exchange.cancel_order(&order.data, order.data.maker).unwrap();
        assert_eq!(
            exchange.fill_order(&order, U256::from(1), TAKER),
            Err(ExchangeError::OrderExpired)
        );

        // Order state takes precedence over authorization.
        let order = sign(
            builder()
                .with_sender(Address::repeat_byte(9))
                .with_salt(U256::from(5)),
        );
        exchange
            .cancel_orders_up_to(U256::from(5), order.data.maker)
            .unwrap();
        assert_eq!(
            exchange.fill_order(&order, U256::from(1), TAKER),
            Err(ExchangeError::OrderUnfillable)
        );

        // Sender before taker before signature.
        let order = SignedOrder {
            signature: Signature::PreSigned.to_bytes(),
            ..sign(
                builder()
                    .with_sender(Address::repeat_byte(9))
                    .with_taker(Address::repeat_byte(8))
                    .with_salt(U256::from(6)),
            )
        };
        assert_eq!(
            exchange.fill_order(&order, U256::from(1), TAKER),
            Err(ExchangeError::AuthorizationFailure(
                Unauthorized::InvalidSender
            ))
        );
        assert_eq!(
            exchange.fill_order(&order, U256::from(1), Address::repeat_byte(9)),
            Err(ExchangeError::AuthorizationFailure(
                Unauthorized::InvalidTaker
            ))
        );
        let ctx = ExecutionContext::relayed(Address::repeat_byte(9), Address::repeat_byte(8));
        assert_eq!(
            exchange.fill_order_as(&ctx, &order, U256::from(1)),
            Err(ExchangeError::InvalidSignature)
        );
    }

    #[test]
    fn fully_filled_order_rejects_further_fills() {
        let mut exchange = funded_exchange();
        let order = sign(builder());
        exchange.fill_order(&order, U256::from(100), TAKER).unwrap();

        assert_eq!(
            exchange.order_info(&order.data).status,
            OrderStatus::FullyFilled
        );
        assert_eq!(
            exchange.fill_order(&order, U256::from(1), TAKER),
            Err(ExchangeError::OrderUnfillable)
        );
        assert_eq!(
            exchange.fill_order(&order, U256::ZERO, TAKER),
            Ok(FillResults::default())
        );
    }

    #[test]
    fn partial_fills_are_capped_by_remaining() {
        let mut exchange = funded_exchange();
        let order = sign(builder());
        exchange.fill_order(&order, U256::from(70), TAKER).unwrap();
        let results = exchange.fill_order(&order, U256::from(70), TAKER).unwrap();

        assert_eq!(results.taker_asset_filled_amount, U256::from(30));
        assert_eq!(
            exchange.filled(&exchange.order_hash(&order.data)),
            U256::from(100)
        );
    }

    #[test]
    fn fill_or_kill() {
        let mut exchange = funded_exchange();
        let order = sign(builder());
        exchange.fill_order(&order, U256::from(60), TAKER).unwrap();
        let balances = exchange.transfers().balances();

        assert_eq!(
            exchange.fill_or_kill_order(&order, U256::from(41), TAKER),
            Err(ExchangeError::IncompleteFill)
        );
        assert_eq!(exchange.transfers().balances(), balances);

        let results = exchange
            .fill_or_kill_order(&order, U256::from(40), TAKER)
            .unwrap();
        assert_eq!(results.taker_asset_filled_amount, U256::from(40));
    }

    #[test]
    fn pre_signed_orders() {
        let mut exchange = funded_exchange();
        let maker = maker().address();
        let order = builder().with_presign(maker).build();
        assert_eq!(
            exchange.fill_order(&order, U256::from(10), TAKER),
            Err(ExchangeError::InvalidSignature)
        );

        exchange.pre_sign(exchange.order_hash(&order.data), maker);
        assert!(exchange.fill_order(&order, U256::from(10), TAKER).is_ok());
    }

    #[test]
    fn cancel_order_requires_maker() {
        let mut exchange = funded_exchange();
        let order = sign(builder());
        assert_eq!(
            exchange.cancel_order(&order.data, TAKER),
            Err(ExchangeError::AuthorizationFailure(
                Unauthorized::InvalidMaker
            ))
        );

        exchange.cancel_order(&order.data, order.data.maker).unwrap();
        exchange.cancel_order(&order.data, order.data.maker).unwrap();
        assert!(exchange.is_cancelled(&exchange.order_hash(&order.data)));
        assert_eq!(
            exchange.fill_order(&order, U256::from(1), TAKER),
            Err(ExchangeError::OrderUnfillable)
        );
    }

    #[test]
    fn batch_cancel_is_all_or_nothing() {
        let mut exchange = funded_exchange();
        let own = sign(builder());
        let foreign = OrderData {
            maker: TAKER,
            ..own.data
        };

        assert_eq!(
            exchange.batch_cancel_orders(&[own.data, foreign], own.data.maker),
            Err(ExchangeError::AuthorizationFailure(
                Unauthorized::InvalidMaker
            ))
        );
        assert!(!exchange.is_cancelled(&exchange.order_hash(&own.data)));

        let other = sign(builder().with_salt(U256::from(2)));
        exchange
            .batch_cancel_orders(&[own.data, other.data], own.data.maker)
            .unwrap();
        assert!(exchange.is_cancelled(&exchange.order_hash(&own.data)));
        assert!(exchange.is_cancelled(&exchange.order_hash(&other.data)));
    }

    #[test]
    fn cancel_orders_up_to() {
        let mut exchange = funded_exchange();
        let maker = maker().address();
        let low = sign(builder().with_salt(U256::from(10)));
        let high = sign(builder().with_salt(U256::from(11)));

        exchange.cancel_orders_up_to(U256::from(10), maker).unwrap();
        assert_eq!(exchange.order_epoch(&maker), Some(U256::from(10)));
        assert_eq!(
            exchange.fill_order(&low, U256::from(1), TAKER),
            Err(ExchangeError::OrderUnfillable)
        );
        assert!(exchange.fill_order(&high, U256::from(1), TAKER).is_ok());

        assert_eq!(
            exchange.cancel_orders_up_to(U256::from(10), maker),
            Err(ExchangeError::InvalidEpoch)
        );
        assert_eq!(
            exchange.cancel_orders_up_to(U256::from(9), maker),
            Err(ExchangeError::InvalidEpoch)
        );
        // Epochs are per maker.
        assert_eq!(exchange.order_epoch(&TAKER), None);
    }

    #[test]
    fn order_info_reports_status() {
        let mut exchange = funded_exchange();
        let order = sign(builder());
        let info = exchange.order_info(&order.data);
        assert_eq!(info.status, OrderStatus::Fillable);
        assert_eq!(info.hash, order.data.hash(&deployment().domain()));
        assert_eq!(info.taker_asset_filled_amount, U256::ZERO);

        let order = sign(builder().with_taker_asset_amount(U256::ZERO));
        assert_eq!(
            exchange.order_info(&order.data).status,
            OrderStatus::InvalidTakerAssetAmount
        );

        let order = sign(builder().with_expiration(U256::from(NOW - 1)));
        assert_eq!(exchange.order_info(&order.data).status, OrderStatus::Expired);

        let order = sign(builder());
        exchange.cancel_order(&order.data, order.data.maker).unwrap();
        assert_eq!(
            exchange.order_info(&order.data).status,
            OrderStatus::Cancelled
        );
    }
}
