use {
    crate::accounts::TestAccount,
    alloy::primitives::{Address, U256},
    model::{
        DomainSeparator,
        order::{OrderBuilder, OrderData, SignedOrder},
        signature::EcdsaSigningScheme,
        transaction::{ExchangeCall, MetaTransaction, SignedTransaction},
    },
};

/// Creates orders with shared defaults and signs them for one exchange
/// domain. Every order gets a fresh salt unless one is set explicitly.
pub struct OrderFactory {
    domain: DomainSeparator,
    defaults: OrderData,
    next_salt: u64,
}

impl OrderFactory {
    pub fn new(domain: DomainSeparator, defaults: OrderData) -> Self {
        Self {
            domain,
            defaults,
            next_salt: 1,
        }
    }

    /// Builder pre-filled with the defaults, `maker` as the maker and a fresh
    /// salt.
    pub fn builder(&mut self, maker: Address) -> OrderBuilder {
        let d = &self.defaults;
        let salt = U256::from(self.next_salt);
        self.next_salt += 1;
        OrderBuilder::default()
            .with_maker(maker)
            .with_taker(d.taker)
            .with_fee_recipient(d.fee_recipient)
            .with_sender(d.sender)
            .with_maker_asset(d.maker_asset.token())
            .with_taker_asset(d.taker_asset.token())
            .with_maker_asset_amount(d.maker_asset_amount)
            .with_taker_asset_amount(d.taker_asset_amount)
            .with_maker_fee(d.maker_fee)
            .with_taker_fee(d.taker_fee)
            .with_expiration(d.expiration)
            .with_salt(salt)
    }

    pub fn sign(&self, builder: OrderBuilder, maker: &TestAccount) -> SignedOrder {
        builder
            .sign_with(EcdsaSigningScheme::Eip712, &self.domain, &maker.signer)
            .expect("local signing never fails")
            .build()
    }

    /// A signed order with the defaults.
    pub fn order(&mut self, maker: &TestAccount) -> SignedOrder {
        let builder = self.builder(maker.address());
        self.sign(builder, maker)
    }

    /// A signed order with the defaults adjusted by `f`.
    pub fn order_with(
        &mut self,
        maker: &TestAccount,
        f: impl FnOnce(OrderBuilder) -> OrderBuilder,
    ) -> SignedOrder {
        let builder = f(self.builder(maker.address()));
        self.sign(builder, maker)
    }
}

/// Creates meta-transactions with unique salts signed for one exchange
/// domain.
pub struct TransactionFactory {
    domain: DomainSeparator,
    next_salt: u64,
}

impl TransactionFactory {
    pub fn new(domain: DomainSeparator) -> Self {
        Self {
            domain,
            next_salt: 1,
        }
    }

    pub fn next_salt(&mut self) -> U256 {
        let salt = U256::from(self.next_salt);
        self.next_salt += 1;
        salt
    }

    pub fn transaction(&mut self, signer: &TestAccount, call: &ExchangeCall) -> SignedTransaction {
        let transaction = MetaTransaction::new(self.next_salt(), signer.address(), call);
        self.signed(transaction, signer, EcdsaSigningScheme::Eip712)
    }

    pub fn signed(
        &self,
        transaction: MetaTransaction,
        signer: &TestAccount,
        scheme: EcdsaSigningScheme,
    ) -> SignedTransaction {
        transaction
            .sign(scheme, &self.domain, &signer.signer)
            .expect("local signing never fails")
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::accounts::AccountGenerator,
        model::{asset::AssetData, signature::verify},
    };

    #[test]
    fn orders_get_fresh_salts_and_valid_signatures() {
        let [maker] = AccountGenerator::default().accounts();
        let domain = DomainSeparator::new(Address::repeat_byte(0xee));
        let mut factory = OrderFactory::new(
            domain,
            OrderData {
                maker_asset: AssetData::erc20(Address::repeat_byte(0xaa)),
                taker_asset: AssetData::erc20(Address::repeat_byte(0xbb)),
                maker_asset_amount: U256::from(10),
                taker_asset_amount: U256::from(20),
                expiration: U256::from(100),
                ..Default::default()
            },
        );

        let first = factory.order(&maker);
        let second = factory.order_with(&maker, |b| b.with_maker_fee(U256::from(1)));
        assert_ne!(first.data.salt, second.data.salt);
        assert_eq!(second.data.maker_fee, U256::from(1));
        assert_eq!(first.data.maker_asset_amount, U256::from(10));
        for order in [first, second] {
            assert!(verify(
                &order.data.hash(&domain),
                &order.signature,
                maker.address()
            ));
        }
    }

    #[test]
    fn transactions_get_fresh_salts() {
        let [signer] = AccountGenerator::default().accounts();
        let mut factory = TransactionFactory::new(DomainSeparator::new(Address::repeat_byte(1)));
        let call = ExchangeCall::CancelOrdersUpTo {
            target_order_epoch: U256::from(1),
        };
        let a = factory.transaction(&signer, &call);
        let b = factory.transaction(&signer, &call);
        assert_ne!(a.transaction.salt, b.transaction.salt);
        assert_eq!(a.transaction.signer, signer.address());
    }
}
