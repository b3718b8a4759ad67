//! Signed meta-transactions and the exchange calls they carry.

use {
    crate::{
        DomainSeparator,
        abi::IExchange,
        asset::AssetDataError,
        hashed_eip712_message,
        order::{OrderData, SignedOrder},
        signature::{EcdsaSignature, EcdsaSigningScheme},
    },
    alloy::{
        primitives::{Address, B256, Bytes, U256, keccak256},
        signers::SignerSync,
        sol,
        sol_types::{SolCall, SolType},
    },
    serde::{Deserialize, Serialize},
    std::sync::LazyLock,
    thiserror::Error,
};

type TransactionHashSol = sol! {
    tuple(
        bytes32, // TRANSACTION_TYPE_HASH
        uint256, // salt
        address, // signerAddress
        bytes32, // keccak(data)
    )
};

static TRANSACTION_TYPE_HASH: LazyLock<B256> =
    LazyLock::new(|| keccak256("ZeroExTransaction(uint256 salt,address signerAddress,bytes data)"));

/// An exchange call signed by `signer` that any relayer may submit on their
/// behalf.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTransaction {
    pub salt: U256,
    pub signer: Address,
    pub data: Bytes,
}

impl MetaTransaction {
    pub fn new(salt: U256, signer: Address, call: &ExchangeCall) -> Self {
        Self {
            salt,
            signer,
            data: call.abi_encode(),
        }
    }

    pub fn hash_struct(&self) -> B256 {
        keccak256(TransactionHashSol::abi_encode_sequence(&(
            *TRANSACTION_TYPE_HASH,
            self.salt,
            self.signer,
            keccak256(&self.data),
        )))
    }

    /// The transaction identity under the given exchange domain. Each
    /// identity can be executed at most once.
    pub fn hash(&self, domain: &DomainSeparator) -> B256 {
        hashed_eip712_message(domain, &self.hash_struct())
    }

    pub fn call(&self) -> Result<ExchangeCall, CallDataError> {
        ExchangeCall::abi_decode(&self.data)
    }

    pub fn sign(
        self,
        signing_scheme: EcdsaSigningScheme,
        domain: &DomainSeparator,
        signer: &impl SignerSync,
    ) -> alloy::signers::Result<SignedTransaction> {
        let signature = EcdsaSignature::sign(signing_scheme, &self.hash(domain), signer)?
            .to_signature(signing_scheme)
            .to_bytes();
        Ok(SignedTransaction {
            transaction: self,
            signature,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub transaction: MetaTransaction,
    pub signature: Bytes,
}

/// Typed view of the call data embedded in a meta-transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExchangeCall {
    FillOrder {
        order: SignedOrder,
        taker_asset_fill_amount: U256,
    },
    FillOrKillOrder {
        order: SignedOrder,
        taker_asset_fill_amount: U256,
    },
    CancelOrder {
        order: OrderData,
    },
    CancelOrdersUpTo {
        target_order_epoch: U256,
    },
}

impl ExchangeCall {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FillOrder { .. } => "fillOrder",
            Self::FillOrKillOrder { .. } => "fillOrKillOrder",
            Self::CancelOrder { .. } => "cancelOrder",
            Self::CancelOrdersUpTo { .. } => "cancelOrdersUpTo",
        }
    }

    /// Encodes the call with its 4-byte selector, as the exchange contract
    /// interface expects it.
    pub fn abi_encode(&self) -> Bytes {
        let data = match self {
            Self::FillOrder {
                order,
                taker_asset_fill_amount,
            } => IExchange::fillOrderCall {
                order: order.data.to_sol(),
                takerAssetFillAmount: *taker_asset_fill_amount,
                signature: order.signature.clone(),
            }
            .abi_encode(),
            Self::FillOrKillOrder {
                order,
                taker_asset_fill_amount,
            } => IExchange::fillOrKillOrderCall {
                order: order.data.to_sol(),
                takerAssetFillAmount: *taker_asset_fill_amount,
                signature: order.signature.clone(),
            }
            .abi_encode(),
            Self::CancelOrder { order } => IExchange::cancelOrderCall {
                order: order.to_sol(),
            }
            .abi_encode(),
            Self::CancelOrdersUpTo { target_order_epoch } => IExchange::cancelOrdersUpToCall {
                targetOrderEpoch: *target_order_epoch,
            }
            .abi_encode(),
        };
        data.into()
    }

    pub fn abi_decode(data: &[u8]) -> Result<Self, CallDataError> {
        let Some((selector, _)) = data.split_first_chunk::<4>() else {
            return Err(CallDataError::MissingSelector);
        };
        let abi_error = |err: alloy::sol_types::Error| CallDataError::Abi(err.to_string());
        match *selector {
            IExchange::fillOrderCall::SELECTOR => {
                let call = IExchange::fillOrderCall::abi_decode(data).map_err(abi_error)?;
                Ok(Self::FillOrder {
                    order: SignedOrder {
                        data: OrderData::try_from(&call.order)?,
                        signature: call.signature,
                    },
                    taker_asset_fill_amount: call.takerAssetFillAmount,
                })
            }
            IExchange::fillOrKillOrderCall::SELECTOR => {
                let call = IExchange::fillOrKillOrderCall::abi_decode(data).map_err(abi_error)?;
                Ok(Self::FillOrKillOrder {
                    order: SignedOrder {
                        data: OrderData::try_from(&call.order)?,
                        signature: call.signature,
                    },
                    taker_asset_fill_amount: call.takerAssetFillAmount,
                })
            }
            IExchange::cancelOrderCall::SELECTOR => {
                let call = IExchange::cancelOrderCall::abi_decode(data).map_err(abi_error)?;
                Ok(Self::CancelOrder {
                    order: OrderData::try_from(&call.order)?,
                })
            }
            IExchange::cancelOrdersUpToCall::SELECTOR => {
                let call = IExchange::cancelOrdersUpToCall::abi_decode(data).map_err(abi_error)?;
                Ok(Self::CancelOrdersUpTo {
                    target_order_epoch: call.targetOrderEpoch,
                })
            }
            other => Err(CallDataError::UnknownSelector(other)),
        }
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CallDataError {
    #[error("call data is shorter than a function selector")]
    MissingSelector,
    #[error("unknown function selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),
    #[error("malformed call arguments: {0}")]
    Abi(String),
    #[error(transparent)]
    Asset(#[from] AssetDataError),
}
