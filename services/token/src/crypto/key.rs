//! Key material resolution for key management algorithms.
//!
//! Callers own their keys; the resolver borrows them for one operation and
//! hands back exactly what the algorithm needs. Shared secrets whose length
//! does not match the AES key size are stretched or shortened through
//! SHA-256, identically on both sides.

use crate::error::JweError;
use crate::jwe::algorithm::{AlgorithmFamily, KeyEncryptionAlgorithm};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

/// Key supplied by the caller.
#[derive(Clone, Copy)]
pub enum KeyMaterial<'a> {
    /// Recipient's RSA public key
    AsymmetricPublic(&'a RsaPublicKey),
    /// Recipient's RSA private key
    AsymmetricPrivate(&'a RsaPrivateKey),
    /// Shared secret of any length
    SymmetricSecret(&'a [u8]),
}

impl KeyMaterial<'_> {
    /// Short description of the variant, safe for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AsymmetricPublic(_) => "rsa public key",
            Self::AsymmetricPrivate(_) => "rsa private key",
            Self::SymmetricSecret(_) => "shared secret",
        }
    }
}

impl fmt::Debug for KeyMaterial<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial({})", self.kind())
    }
}

/// Which side of the exchange the key is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Producing a token
    Encrypt,
    /// Consuming a token
    Decrypt,
}

/// Key in the exact form the algorithm consumes.
pub enum ResolvedKey<'a> {
    /// RSA public key, used to encrypt the CEK
    Public(&'a RsaPublicKey),
    /// RSA private key, used to decrypt the CEK
    Private(&'a RsaPrivateKey),
    /// AES key encryption key of the required length
    Symmetric(Zeroizing<Vec<u8>>),
}

impl ResolvedKey<'_> {
    /// Symmetric key bytes, if this is a symmetric key.
    #[must_use]
    pub fn symmetric_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Symmetric(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }
}

impl fmt::Debug for ResolvedKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public(_) => f.write_str("ResolvedKey::Public(..)"),
            Self::Private(_) => f.write_str("ResolvedKey::Private(..)"),
            Self::Symmetric(bytes) => write!(f, "ResolvedKey::Symmetric({} bytes)", bytes.len()),
        }
    }
}

/// Resolve caller key material for `algorithm` in `direction`.
///
/// # Errors
///
/// Returns [`JweError::MissingKeyMaterial`] when the supplied key is not of
/// the kind the algorithm and direction require.
pub fn resolve<'a>(
    algorithm: KeyEncryptionAlgorithm,
    supplied: &KeyMaterial<'a>,
    direction: Direction,
) -> Result<ResolvedKey<'a>, JweError> {
    match algorithm.family() {
        AlgorithmFamily::Rsa => match (direction, *supplied) {
            (Direction::Encrypt, KeyMaterial::AsymmetricPublic(key)) => Ok(ResolvedKey::Public(key)),
            (Direction::Decrypt, KeyMaterial::AsymmetricPrivate(key)) => {
                Ok(ResolvedKey::Private(key))
            }
            (Direction::Encrypt, other) => Err(JweError::missing_key(format!(
                "{algorithm} encryption requires an rsa public key, got {}",
                other.kind()
            ))),
            (Direction::Decrypt, other) => Err(JweError::missing_key(format!(
                "{algorithm} decryption requires an rsa private key, got {}",
                other.kind()
            ))),
        },
        AlgorithmFamily::Aes => {
            let required = algorithm
                .required_key_len()
                .ok_or_else(|| JweError::unsupported(algorithm.name()))?;
            match *supplied {
                KeyMaterial::SymmetricSecret(secret) => {
                    Ok(ResolvedKey::Symmetric(derive_symmetric_key(secret, required)))
                }
                other => Err(JweError::missing_key(format!(
                    "{algorithm} requires a shared secret, got {}",
                    other.kind()
                ))),
            }
        }
    }
}

/// Fit a shared secret to `required` bytes.
///
/// A secret of the right length is used as is; anything else is replaced by
/// the leading `required` bytes of its SHA-256 digest.
#[must_use]
pub fn derive_symmetric_key(secret: &[u8], required: usize) -> Zeroizing<Vec<u8>> {
    if secret.len() == required {
        return Zeroizing::new(secret.to_vec());
    }
    let digest = Zeroizing::new(<[u8; 32]>::from(Sha256::digest(secret)));
    Zeroizing::new(digest[..required.min(digest.len())].to_vec())
}
