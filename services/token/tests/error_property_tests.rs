//! Property-based tests for error handling.
//!
//! Cryptographic failures must look identical to callers whatever the cause.

use proptest::prelude::*;
use std::collections::HashSet;
use std::error::Error as _;
use token_jwe::crypto::{CryptoError, KeyMaterial};
use token_jwe::jwe::{BlockEncryptionAlgorithm, ClaimSet, JweDecrypter, JweEncrypter, JweHeader, KeyEncryptionAlgorithm};
use token_jwe::{ErrorKind, FormatError, JweError};

/// Arbitrary cause message, marked so leaks are easy to spot.
fn arb_cause() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,40}".prop_map(|s| format!("LEAK-{s}"))
}

/// Every provider failure that can end a decryption.
fn arb_crypto_error() -> impl Strategy<Value = CryptoError> {
    arb_cause().prop_flat_map(|cause| {
        prop_oneof![
            Just(CryptoError::KeyUnwrap(cause.clone())),
            Just(CryptoError::Decryption(cause.clone())),
            Just(CryptoError::KeyMismatch(cause.clone())),
            Just(CryptoError::AlgorithmNotAccepted(cause.clone())),
            Just(CryptoError::Integrity),
            Just(CryptoError::InvalidLength { what: "tag", expected: 16, actual: 3 }),
        ]
    })
}

fn all_errors(msg: &str) -> Vec<JweError> {
    vec![
        JweError::from(FormatError::InvalidHeader(msg.to_string())),
        JweError::unsupported(msg),
        JweError::missing_key(msg),
        JweError::encryption(CryptoError::encryption(msg)),
        JweError::decryption(CryptoError::decryption(msg)),
        JweError::policy(msg),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Decryption errors share one message and keep the cause as `source`.
    #[test]
    fn prop_decryption_errors_are_uniform(cause in arb_crypto_error()) {
        let err = JweError::decryption(cause.clone());

        prop_assert_eq!(err.kind(), ErrorKind::Decryption);
        prop_assert_eq!(err.to_string(), "JWE decryption failed");
        prop_assert_eq!(err.public_message(), "Unable to decrypt token");
        prop_assert!(!err.to_string().contains("LEAK"));
        prop_assert_eq!(err.source().map(ToString::to_string), Some(cause.to_string()));
    }

    /// Encryption errors hide their cause too.
    #[test]
    fn prop_encryption_errors_hide_cause(cause in arb_cause()) {
        let err = JweError::encryption(CryptoError::key_wrap(cause.clone()));
        prop_assert_eq!(err.kind(), ErrorKind::Encryption);
        prop_assert!(!err.public_message().contains(&cause));
        prop_assert!(!err.is_safe_to_report());
    }

    /// Nothing is retryable; safe kinds report their specific message.
    #[test]
    fn prop_error_classification(msg in "LEAK-[a-z]{1,20}") {
        for err in all_errors(&msg) {
            prop_assert!(!err.is_retryable());
            if err.is_safe_to_report() {
                prop_assert!(err.public_message().contains(&msg));
            } else {
                prop_assert!(!err.public_message().contains(&msg));
            }
        }
    }

    /// A wrong key and a corrupted token are indistinguishable.
    #[test]
    fn prop_wrong_key_and_corruption_look_alike(
        secret in "[a-z]{8,16}",
        wrong in "[A-Z]{8,16}",
    ) {
        let key = KeyMaterial::SymmetricSecret(secret.as_bytes());
        let compact = JweEncrypter::default()
            .encrypt_claims(
                JweHeader::new(KeyEncryptionAlgorithm::A128Kw, BlockEncryptionAlgorithm::A128CbcHs256),
                ClaimSet::new(),
                &key,
            )
            .unwrap()
            .to_string();

        let wrong_key = JweDecrypter::default()
            .decrypt(&compact, &KeyMaterial::SymmetricSecret(wrong.as_bytes()))
            .unwrap_err();

        let mut parts: Vec<&str> = compact.split('.').collect();
        parts[4] = "AAAAAAAAAAAAAAAAAAAAAA";
        let corrupted = JweDecrypter::default().decrypt(&parts.join("."), &key).unwrap_err();

        prop_assert_eq!(wrong_key.kind(), corrupted.kind());
        prop_assert_eq!(wrong_key.to_string(), corrupted.to_string());
        prop_assert_eq!(wrong_key.public_message(), corrupted.public_message());
    }
}

#[test]
fn test_error_codes_are_unique() {
    let codes: HashSet<&str> = all_errors("x").iter().map(|err| err.kind().code()).collect();
    assert_eq!(codes.len(), 6);
}
