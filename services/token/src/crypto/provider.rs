//! Crypto provider seam used by the JWE engine.

use super::error::CryptoError;
use super::key::ResolvedKey;
use crate::jwe::algorithm::{BlockEncryptionAlgorithm, KeyEncryptionAlgorithm};
use rand::RngCore;
use zeroize::Zeroizing;

/// Output of a content encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AeadOutput {
    /// Initialization vector
    pub iv: Vec<u8>,
    /// Ciphertext
    pub ciphertext: Vec<u8>,
    /// Authentication tag
    pub tag: Vec<u8>,
}

/// Raw cryptographic operations behind JWE.
///
/// Implementations must be stateless or internally synchronized; the engine
/// shares one provider across concurrent calls.
pub trait CryptoProvider: Send + Sync {
    /// Generate a fresh content encryption key for `enc`.
    fn generate_cek(&self, enc: BlockEncryptionAlgorithm) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let mut cek = Zeroizing::new(vec![0u8; enc.cek_len()]);
        rand::thread_rng().fill_bytes(cek.as_mut_slice());
        Ok(cek)
    }

    /// Encrypt or wrap `cek` under the key encryption key.
    fn wrap_key(
        &self,
        alg: KeyEncryptionAlgorithm,
        kek: &ResolvedKey<'_>,
        cek: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Decrypt or unwrap an encrypted key back into the CEK.
    fn unwrap_key(
        &self,
        alg: KeyEncryptionAlgorithm,
        kek: &ResolvedKey<'_>,
        wrapped: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Encrypt `plaintext` under `cek`, authenticating `aad`.
    ///
    /// A fresh IV is generated for every call.
    fn aead_encrypt(
        &self,
        enc: BlockEncryptionAlgorithm,
        cek: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<AeadOutput, CryptoError>;

    /// Verify and decrypt `ciphertext` under `cek`.
    fn aead_decrypt(
        &self,
        enc: BlockEncryptionAlgorithm,
        cek: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;
}
