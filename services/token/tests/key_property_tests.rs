//! Property-based tests for key material resolution.

use proptest::prelude::*;
use sha2::{Digest, Sha256};
use token_jwe::crypto::{derive_symmetric_key, resolve, Direction, KeyMaterial};
use token_jwe::jwe::KeyEncryptionAlgorithm;
use token_jwe::ErrorKind;

fn arb_symmetric_alg() -> impl Strategy<Value = KeyEncryptionAlgorithm> {
    prop_oneof![Just(KeyEncryptionAlgorithm::A128Kw), Just(KeyEncryptionAlgorithm::A256Kw)]
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Encrypt), Just(Direction::Decrypt)]
}

fn resolved_bytes(alg: KeyEncryptionAlgorithm, secret: &[u8], direction: Direction) -> Vec<u8> {
    resolve(alg, &KeyMaterial::SymmetricSecret(secret), direction)
        .unwrap()
        .symmetric_bytes()
        .unwrap()
        .to_vec()
}

// =============================================================================
// Symmetric derivation
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The same secret resolves to the same key on both sides.
    #[test]
    fn prop_derivation_is_deterministic(
        alg in arb_symmetric_alg(),
        secret in prop::collection::vec(any::<u8>(), 0..100),
    ) {
        let encrypt_side = resolved_bytes(alg, &secret, Direction::Encrypt);
        let decrypt_side = resolved_bytes(alg, &secret, Direction::Decrypt);

        prop_assert_eq!(&encrypt_side, &decrypt_side);
        prop_assert_eq!(encrypt_side, resolved_bytes(alg, &secret, Direction::Encrypt));
    }

    /// Resolution never fails on length and always yields the required size.
    #[test]
    fn prop_resolved_length_matches_algorithm(
        alg in arb_symmetric_alg(),
        direction in arb_direction(),
        secret in prop::collection::vec(any::<u8>(), 0..100),
    ) {
        let required = alg.required_key_len().unwrap();
        let key = resolved_bytes(alg, &secret, direction);
        prop_assert_eq!(key.len(), required);

        if secret.len() == required {
            prop_assert_eq!(key, secret);
        } else {
            let digest = Sha256::digest(&secret);
            prop_assert_eq!(key.as_slice(), &digest[..required]);
        }
    }

    /// Distinct secrets of mismatched length resolve to distinct keys.
    #[test]
    fn prop_distinct_secrets_distinct_keys(
        alg in arb_symmetric_alg(),
        s1 in prop::collection::vec(any::<u8>(), 1..40),
        s2 in prop::collection::vec(any::<u8>(), 1..40),
    ) {
        prop_assume!(s1 != s2);
        let required = alg.required_key_len().unwrap();
        prop_assume!(s1.len() != required && s2.len() != required);

        prop_assert_ne!(derive_symmetric_key(&s1, required).to_vec(), derive_symmetric_key(&s2, required).to_vec());
    }
}

// =============================================================================
// Asymmetric requirements
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// RSA algorithms never accept a shared secret.
    #[test]
    fn prop_rsa_rejects_shared_secret(
        rsa_oaep in any::<bool>(),
        direction in arb_direction(),
        secret in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let alg = if rsa_oaep { KeyEncryptionAlgorithm::RsaOaep } else { KeyEncryptionAlgorithm::Rsa1_5 };
        let err = resolve(alg, &KeyMaterial::SymmetricSecret(&secret), direction).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::MissingKeyMaterial);
    }
}
