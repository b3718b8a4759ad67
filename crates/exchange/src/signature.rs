use {
    crate::state::OrderState,
    alloy::primitives::{Address, B256},
    model::signature::{self, SigningScheme},
};

/// Checks `signature` of `hash` by `signer`, accepting pre-signed hashes
/// recorded in `state` in addition to ECDSA signatures.
pub fn is_valid(state: &OrderState, hash: &B256, signer: Address, signature: &[u8]) -> bool {
    match signature.split_last() {
        Some((&id, [])) if SigningScheme::from_id(id) == Some(SigningScheme::PreSigned) => {
            !signer.is_zero() && state.is_pre_signed(hash, &signer)
        }
        _ => signature::verify(hash, signature, signer),
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::keccak256,
            signers::local::PrivateKeySigner,
        },
        model::signature::{EcdsaSignature, EcdsaSigningScheme, Signature},
    };

    #[test]
    fn accepts_ecdsa_signatures() {
        let signer = PrivateKeySigner::from_slice(&[0x33; 32]).unwrap();
        let hash = keccak256(b"hash");
        let signature = EcdsaSignature::sign(EcdsaSigningScheme::EthSign, &hash, &signer)
            .unwrap()
            .to_signature(EcdsaSigningScheme::EthSign)
            .to_bytes();
        let state = OrderState::default();
        assert!(is_valid(&state, &hash, signer.address(), &signature));
        assert!(!is_valid(&state, &hash, Address::repeat_byte(1), &signature));
    }

    #[test]
    fn pre_signed_requires_registration() {
        let signer = Address::repeat_byte(1);
        let hash = keccak256(b"hash");
        let presigned = Signature::PreSigned.to_bytes();

        let mut state = OrderState::default();
        assert!(!is_valid(&state, &hash, signer, &presigned));

        state.pre_sign(hash, signer);
        assert!(is_valid(&state, &hash, signer, &presigned));
        assert!(!is_valid(&state, &hash, Address::repeat_byte(2), &presigned));
        assert!(!is_valid(&state, &keccak256(b"other"), signer, &presigned));
    }

    #[test]
    fn zero_signer_is_never_valid() {
        let mut state = OrderState::default();
        let hash = keccak256(b"hash");
        state.pre_sign(hash, Address::ZERO);
        assert!(!is_valid(
            &state,
            &hash,
            Address::ZERO,
            &Signature::PreSigned.to_bytes()
        ));
    }
}
