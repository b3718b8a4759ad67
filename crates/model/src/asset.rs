//! Asset descriptors as they are committed to in signed orders.

use {
    alloy::primitives::{Address, Bytes},
    hex_literal::hex,
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

/// `bytes4(keccak256("ERC20Token(address)"))`, the id of the ERC20 asset
/// proxy.
pub const ERC20_PROXY_ID: [u8; 4] = hex!("f47261b0");

/// Length of encoded ERC20 asset data: proxy id followed by one ABI word.
const ERC20_ASSET_DATA_LEN: usize = 4 + 32;

/// Describes which asset an order side refers to and which proxy moves it.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum AssetData {
    Erc20 { token: Address },
}

impl Default for AssetData {
    fn default() -> Self {
        Self::Erc20 {
            token: Address::ZERO,
        }
    }
}

impl AssetData {
    pub fn erc20(token: Address) -> Self {
        Self::Erc20 { token }
    }

    pub fn proxy_id(&self) -> [u8; 4] {
        match self {
            Self::Erc20 { .. } => ERC20_PROXY_ID,
        }
    }

    /// The token contract holding balances of this asset.
    pub fn token(&self) -> Address {
        match self {
            Self::Erc20 { token } => *token,
        }
    }

    /// ABI encoding as used in the order hash and in call data.
    pub fn encode(&self) -> Bytes {
        match self {
            Self::Erc20 { token } => {
                let mut bytes = Vec::with_capacity(ERC20_ASSET_DATA_LEN);
                bytes.extend_from_slice(&ERC20_PROXY_ID);
                bytes.extend_from_slice(&[0u8; 12]);
                bytes.extend_from_slice(token.as_slice());
                bytes.into()
            }
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, AssetDataError> {
        let Some((proxy_id, params)) = bytes.split_first_chunk::<4>() else {
            return Err(AssetDataError::InvalidLength {
                expected: ERC20_ASSET_DATA_LEN,
                actual: bytes.len(),
            });
        };
        match *proxy_id {
            ERC20_PROXY_ID => {
                if bytes.len() != ERC20_ASSET_DATA_LEN {
                    return Err(AssetDataError::InvalidLength {
                        expected: ERC20_ASSET_DATA_LEN,
                        actual: bytes.len(),
                    });
                }
                let (padding, token) = params.split_at(12);
                if padding.iter().any(|byte| *byte != 0) {
                    return Err(AssetDataError::InvalidAddressPadding);
                }
                Ok(Self::Erc20 {
                    token: Address::from_slice(token),
                })
            }
            other => Err(AssetDataError::UnknownProxy(other)),
        }
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AssetDataError {
    #[error("asset data must be {expected} bytes long but is {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("unknown asset proxy id 0x{}", hex::encode(.0))]
    UnknownProxy([u8; 4]),
    #[error("asset token address is not left padded with zeros")]
    InvalidAddressPadding,
}
