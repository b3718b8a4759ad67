use {
    alloy::{
        primitives::{Address, B256, Bytes, U256, keccak256},
        signers::SignerSync,
    },
    serde::{Deserialize, Serialize},
    std::fmt::{self, Debug, Formatter},
    thiserror::Error,
};

/// See [`Signature`].
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SigningScheme {
    #[default]
    Eip712,
    EthSign,
    PreSigned,
}

impl SigningScheme {
    /// The trailing byte identifying the scheme in encoded signatures.
    pub fn id(self) -> u8 {
        match self {
            Self::Eip712 => 0x02,
            Self::EthSign => 0x03,
            Self::PreSigned => 0x06,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0x02 => Some(Self::Eip712),
            0x03 => Some(Self::EthSign),
            0x06 => Some(Self::PreSigned),
            _ => None,
        }
    }

    pub fn try_to_ecdsa_scheme(&self) -> Option<EcdsaSigningScheme> {
        match self {
            Self::Eip712 => Some(EcdsaSigningScheme::Eip712),
            Self::EthSign => Some(EcdsaSigningScheme::EthSign),
            Self::PreSigned => None,
        }
    }
}

/// Signature over an EIP-712 digest (an order hash or a transaction hash).
#[derive(Eq, PartialEq, Clone, Copy, Hash)]
pub enum Signature {
    /// The digest is signed directly.
    ///
    /// https://eips.ethereum.org/EIPS/eip-712
    Eip712(EcdsaSignature),
    /// The digest is signed according to EIP-191's personal_sign format.
    ///
    /// https://eips.ethereum.org/EIPS/eip-191
    EthSign(EcdsaSignature),
    /// The signer approved the digest on the exchange beforehand. Validity
    /// can only be checked against exchange state.
    PreSigned,
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if let Signature::PreSigned = self {
            return f.write_str("PreSigned");
        }

        let scheme = format!("{:?}", self.scheme());
        let bytes = format!("0x{}", hex::encode(self.to_bytes()));
        f.debug_tuple(&scheme).field(&bytes).finish()
    }
}

impl Signature {
    pub fn scheme(&self) -> SigningScheme {
        match self {
            Signature::Eip712(_) => SigningScheme::Eip712,
            Signature::EthSign(_) => SigningScheme::EthSign,
            Signature::PreSigned => SigningScheme::PreSigned,
        }
    }

    /// Parses the wire encoding: the scheme id is the trailing byte. ECDSA
    /// signatures are laid out as `v ‖ r ‖ s ‖ id`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        let (&id, body) = bytes.split_last().ok_or(SignatureError::Empty)?;
        let scheme = SigningScheme::from_id(id).ok_or(SignatureError::UnsupportedScheme(id))?;
        match scheme.try_to_ecdsa_scheme() {
            Some(ecdsa_scheme) => {
                let body: &[u8; 65] =
                    body.try_into()
                        .map_err(|_| SignatureError::InvalidLength {
                            scheme,
                            expected: 66,
                            actual: bytes.len(),
                        })?;
                Ok(EcdsaSignature::from_bytes(body).to_signature(ecdsa_scheme))
            }
            None if body.is_empty() => Ok(Self::PreSigned),
            None => Err(SignatureError::InvalidLength {
                scheme,
                expected: 1,
                actual: bytes.len(),
            }),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Eip712(signature) | Self::EthSign(signature) => {
                let mut bytes = Vec::with_capacity(66);
                bytes.extend_from_slice(&signature.to_bytes());
                bytes.push(self.scheme().id());
                bytes.into()
            }
            Self::PreSigned => vec![SigningScheme::PreSigned.id()].into(),
        }
    }

    /// Recovers the signer of the specified digest.
    ///
    /// Returns `None` for [`Signature::PreSigned`] which does not support
    /// owner recovery.
    pub fn recover(&self, hash: &B256) -> Result<Option<Address>, SignatureError> {
        match self {
            Self::Eip712(signature) => signature
                .recover(EcdsaSigningScheme::Eip712, hash)
                .map(Some),
            Self::EthSign(signature) => signature
                .recover(EcdsaSigningScheme::EthSign, hash)
                .map(Some),
            Self::PreSigned => Ok(None),
        }
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum SignatureError {
    #[error("signature is empty")]
    Empty,
    #[error("unsupported signature scheme id {0:#04x}")]
    UnsupportedScheme(u8),
    #[error("{scheme:?} signature must be {expected} bytes long but is {actual}")]
    InvalidLength {
        scheme: SigningScheme,
        expected: usize,
        actual: usize,
    },
    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),
    #[error("unable to recover signer")]
    Unrecoverable,
}

/// Checks that `signature` is a valid ECDSA signature of `hash` by
/// `claimed_signer`.
///
/// Fails closed: malformed encodings, unknown schemes, unrecoverable
/// signatures and the zero address all yield `false`. Pre-signed hashes are
/// not accepted here since they require exchange state.
pub fn verify(hash: &B256, signature: &[u8], claimed_signer: Address) -> bool {
    if claimed_signer.is_zero() {
        return false;
    }
    match Signature::from_bytes(signature).and_then(|signature| signature.recover(hash)) {
        Ok(Some(recovered)) => recovered == claimed_signer,
        Ok(None) | Err(_) => false,
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EcdsaSigningScheme {
    Eip712,
    EthSign,
}

impl From<EcdsaSigningScheme> for SigningScheme {
    fn from(scheme: EcdsaSigningScheme) -> Self {
        match scheme {
            EcdsaSigningScheme::Eip712 => Self::Eip712,
            EcdsaSigningScheme::EthSign => Self::EthSign,
        }
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Hash)]
pub struct EcdsaSignature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

/// Returns the message used for signing and recovery for the specified hash.
///
/// The signing message depends on the signature scheme that was used.
fn signing_message(signing_scheme: EcdsaSigningScheme, hash: &B256) -> B256 {
    match signing_scheme {
        EcdsaSigningScheme::Eip712 => *hash,
        EcdsaSigningScheme::EthSign => {
            let mut buffer = [0u8; 60];
            buffer[..28].copy_from_slice(b"\x19Ethereum Signed Message:\n32");
            buffer[28..].copy_from_slice(hash.as_slice());
            keccak256(buffer)
        }
    }
}

impl EcdsaSignature {
    pub fn to_signature(self, scheme: EcdsaSigningScheme) -> Signature {
        match scheme {
            EcdsaSigningScheme::Eip712 => Signature::Eip712(self),
            EcdsaSigningScheme::EthSign => Signature::EthSign(self),
        }
    }

    /// v + r + s
    pub fn to_bytes(self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0] = self.v;
        bytes[1..33].copy_from_slice(self.r.as_slice());
        bytes[33..65].copy_from_slice(self.s.as_slice());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        EcdsaSignature {
            v: bytes[0],
            r: B256::from_slice(&bytes[1..33]),
            s: B256::from_slice(&bytes[33..65]),
        }
    }

    pub fn recover(
        &self,
        signing_scheme: EcdsaSigningScheme,
        hash: &B256,
    ) -> Result<Address, SignatureError> {
        let y_parity = match self.v {
            27 => false,
            28 => true,
            v => return Err(SignatureError::InvalidRecoveryId(v)),
        };
        let message = signing_message(signing_scheme, hash);
        let signature = alloy::primitives::Signature::new(
            U256::from_be_bytes(self.r.0),
            U256::from_be_bytes(self.s.0),
            y_parity,
        );
        signature
            .recover_address_from_prehash(&message)
            .map_err(|_| SignatureError::Unrecoverable)
    }

    pub fn sign(
        signing_scheme: EcdsaSigningScheme,
        hash: &B256,
        signer: &impl SignerSync,
    ) -> alloy::signers::Result<Self> {
        let message = signing_message(signing_scheme, hash);
        let signature = signer.sign_hash_sync(&message)?;
        Ok(Self {
            v: 27 + u8::from(signature.v()),
            r: B256::new(signature.r().to_be_bytes::<32>()),
            s: B256::new(signature.s().to_be_bytes::<32>()),
        })
    }
}
