//! Orders as they are signed by makers and settled by the exchange.

use {
    crate::{
        DomainSeparator,
        abi::IExchange,
        asset::AssetData,
        hashed_eip712_message,
        signature::{EcdsaSignature, EcdsaSigningScheme, Signature},
        transaction::CallDataError,
    },
    alloy::{
        primitives::{Address, B256, Bytes, U256, keccak256},
        signers::{Signer, SignerSync},
        sol,
        sol_types::SolType,
    },
    serde::{Deserialize, Serialize},
    std::sync::LazyLock,
};

type OrderHashSol = sol! {
    tuple(
        bytes32, // ORDER_TYPE_HASH
        address, // makerAddress
        address, // takerAddress
        address, // feeRecipientAddress
        address, // senderAddress
        uint256, // makerAssetAmount
        uint256, // takerAssetAmount
        uint256, // makerFee
        uint256, // takerFee
        uint256, // expirationTimeSeconds
        uint256, // salt
        bytes32, // keccak(makerAssetData)
        bytes32, // keccak(takerAssetData)
    )
};

static ORDER_TYPE_HASH: LazyLock<B256> = LazyLock::new(|| {
    keccak256(
        "Order(address makerAddress,address takerAddress,address feeRecipientAddress,address \
         senderAddress,uint256 makerAssetAmount,uint256 takerAssetAmount,uint256 \
         makerFee,uint256 takerFee,uint256 expirationTimeSeconds,uint256 salt,bytes \
         makerAssetData,bytes takerAssetData)",
    )
});

/// The complete order data.
///
/// These are the exact fields that get signed by the maker and verified by
/// the exchange. A zero `taker` or `sender` means the order is not restricted
/// to a specific account.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub maker: Address,
    pub taker: Address,
    pub fee_recipient: Address,
    pub sender: Address,
    pub maker_asset: AssetData,
    pub taker_asset: AssetData,
    pub maker_asset_amount: U256,
    pub taker_asset_amount: U256,
    pub maker_fee: U256,
    pub taker_fee: U256,
    /// Unix timestamp in seconds. The order is expired at and after this
    /// instant.
    pub expiration: U256,
    pub salt: U256,
}

impl OrderData {
    /// Returns the value of hashStruct() over the order data as defined by
    /// EIP-712.
    ///
    /// https://eips.ethereum.org/EIPS/eip-712#definition-of-hashstruct
    pub fn hash_struct(&self) -> B256 {
        keccak256(OrderHashSol::abi_encode_sequence(&(
            *ORDER_TYPE_HASH,
            self.maker,
            self.taker,
            self.fee_recipient,
            self.sender,
            self.maker_asset_amount,
            self.taker_asset_amount,
            self.maker_fee,
            self.taker_fee,
            self.expiration,
            self.salt,
            keccak256(self.maker_asset.encode()),
            keccak256(self.taker_asset.encode()),
        )))
    }

    /// The order identity under the given exchange domain.
    pub fn hash(&self, domain: &DomainSeparator) -> B256 {
        hashed_eip712_message(domain, &self.hash_struct())
    }

    pub fn is_expired(&self, now: u64) -> bool {
        U256::from(now) >= self.expiration
    }

    pub fn has_taker_restriction(&self) -> bool {
        !self.taker.is_zero()
    }

    pub fn has_sender_restriction(&self) -> bool {
        !self.sender.is_zero()
    }

    pub fn to_sol(&self) -> IExchange::Order {
        IExchange::Order {
            makerAddress: self.maker,
            takerAddress: self.taker,
            feeRecipientAddress: self.fee_recipient,
            senderAddress: self.sender,
            makerAssetAmount: self.maker_asset_amount,
            takerAssetAmount: self.taker_asset_amount,
            makerFee: self.maker_fee,
            takerFee: self.taker_fee,
            expirationTimeSeconds: self.expiration,
            salt: self.salt,
            makerAssetData: self.maker_asset.encode(),
            takerAssetData: self.taker_asset.encode(),
        }
    }
}

impl TryFrom<&IExchange::Order> for OrderData {
    type Error = CallDataError;

    fn try_from(order: &IExchange::Order) -> Result<Self, Self::Error> {
        Ok(Self {
            maker: order.makerAddress,
            taker: order.takerAddress,
            fee_recipient: order.feeRecipientAddress,
            sender: order.senderAddress,
            maker_asset: AssetData::decode(&order.makerAssetData)?,
            taker_asset: AssetData::decode(&order.takerAssetData)?,
            maker_asset_amount: order.makerAssetAmount,
            taker_asset_amount: order.takerAssetAmount,
            maker_fee: order.makerFee,
            taker_fee: order.takerFee,
            expiration: order.expirationTimeSeconds,
            salt: order.salt,
        })
    }
}

/// An order together with the maker's signature over its identity.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    #[serde(flatten)]
    pub data: OrderData,
    pub signature: Bytes,
}

#[derive(Clone, Default, Debug)]
pub struct OrderBuilder(SignedOrder);

impl OrderBuilder {
    pub fn with_maker(mut self, maker: Address) -> Self {
        self.0.data.maker = maker;
        self
    }

    pub fn with_taker(mut self, taker: Address) -> Self {
        self.0.data.taker = taker;
        self
    }

    pub fn with_fee_recipient(mut self, fee_recipient: Address) -> Self {
        self.0.data.fee_recipient = fee_recipient;
        self
    }

    pub fn with_sender(mut self, sender: Address) -> Self {
        self.0.data.sender = sender;
        self
    }

    pub fn with_maker_asset(mut self, token: Address) -> Self {
        self.0.data.maker_asset = AssetData::erc20(token);
        self
    }

    pub fn with_taker_asset(mut self, token: Address) -> Self {
        self.0.data.taker_asset = AssetData::erc20(token);
        self
    }

    pub fn with_maker_asset_amount(mut self, amount: U256) -> Self {
        self.0.data.maker_asset_amount = amount;
        self
    }

    pub fn with_taker_asset_amount(mut self, amount: U256) -> Self {
        self.0.data.taker_asset_amount = amount;
        self
    }

    pub fn with_maker_fee(mut self, fee: U256) -> Self {
        self.0.data.maker_fee = fee;
        self
    }

    pub fn with_taker_fee(mut self, fee: U256) -> Self {
        self.0.data.taker_fee = fee;
        self
    }

    pub fn with_expiration(mut self, expiration: U256) -> Self {
        self.0.data.expiration = expiration;
        self
    }

    pub fn with_salt(mut self, salt: U256) -> Self {
        self.0.data.salt = salt;
        self
    }

    pub fn with_signature(mut self, signature: Bytes) -> Self {
        self.0.signature = signature;
        self
    }

    /// Marks the order as pre-signed by `maker`.
    pub fn with_presign(mut self, maker: Address) -> Self {
        self.0.data.maker = maker;
        self.0.signature = Signature::PreSigned.to_bytes();
        self
    }

    /// Sets maker and signature.
    pub fn sign_with(
        mut self,
        signing_scheme: EcdsaSigningScheme,
        domain: &DomainSeparator,
        signer: &(impl Signer + SignerSync),
    ) -> alloy::signers::Result<Self> {
        self.0.data.maker = signer.address();
        let hash = self.0.data.hash(domain);
        self.0.signature = EcdsaSignature::sign(signing_scheme, &hash, signer)?
            .to_signature(signing_scheme)
            .to_bytes();
        Ok(self)
    }

    pub fn build(self) -> SignedOrder {
        self.0
    }
}
