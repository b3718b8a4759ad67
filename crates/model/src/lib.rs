//! Contains the order, signature and meta-transaction models that are shared
//! between the exchange, the whitelist gate and test tooling.

pub mod abi;
pub mod asset;
pub mod order;
pub mod signature;
pub mod transaction;

use {
    alloy::{
        primitives::{Address, B256, keccak256},
        sol,
        sol_types::SolType,
    },
    hex::{FromHex, FromHexError},
    std::{fmt, sync::LazyLock},
};

type DomainSeparatorSol = sol! {
    tuple(
        bytes32, // EIP712_DOMAIN_TYPEHASH
        bytes32, // keccak(domain.name)
        bytes32, // keccak(domain.version)
        address, // verifyingContract
    )
};

/// domainSeparator as defined by EIP-712. Every signed order and
/// meta-transaction commits to it so that signatures can not be replayed
/// against another exchange instance.
///
/// https://eips.ethereum.org/EIPS/eip-712#definition-of-domainseparator
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct DomainSeparator(pub B256);

impl std::str::FromStr for DomainSeparator {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self(B256::new(FromHex::from_hex(s)?)))
    }
}

impl fmt::Debug for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl DomainSeparator {
    pub fn new(verifying_contract: Address) -> Self {
        static DOMAIN_TYPE_HASH: LazyLock<B256> = LazyLock::new(|| {
            keccak256(b"EIP712Domain(string name,string version,address verifyingContract)")
        });

        static DOMAIN_NAME: LazyLock<B256> = LazyLock::new(|| keccak256(b"0x Protocol"));

        static DOMAIN_VERSION: LazyLock<B256> = LazyLock::new(|| keccak256(b"2"));

        Self(keccak256(DomainSeparatorSol::abi_encode_sequence(&(
            *DOMAIN_TYPE_HASH,
            *DOMAIN_NAME,
            *DOMAIN_VERSION,
            verifying_contract,
        ))))
    }
}

/// Returns the EIP-712 digest of a struct hash under the given domain.
pub fn hashed_eip712_message(domain_separator: &DomainSeparator, struct_hash: &B256) -> B256 {
    let mut message = [0u8; 66];
    message[0..2].copy_from_slice(&[0x19, 0x01]);
    message[2..34].copy_from_slice(domain_separator.0.as_slice());
    message[34..66].copy_from_slice(struct_hash.as_slice());
    keccak256(message)
}
