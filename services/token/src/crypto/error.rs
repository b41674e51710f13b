//! Error types for crypto provider operations.

use thiserror::Error;

/// Errors from [`CryptoProvider`](super::CryptoProvider) operations.
///
/// Messages describe what failed, never the key or data involved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Algorithm not implemented by this provider
    #[error("Algorithm not implemented: {0}")]
    UnsupportedAlgorithm(String),

    /// Token algorithm differs from the one the recipient accepts
    #[error("Algorithm not accepted: {0}")]
    AlgorithmNotAccepted(String),

    /// Key kind does not fit the algorithm
    #[error("Key does not match algorithm: {0}")]
    KeyMismatch(String),

    /// Key, CEK or IV of the wrong size
    #[error("Invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// What was measured
        what: &'static str,
        /// Length the algorithm requires
        expected: usize,
        /// Length supplied
        actual: usize,
    },

    /// Content encryption key wrapping failed
    #[error("Key wrap failed: {0}")]
    KeyWrap(String),

    /// Content encryption key unwrapping failed
    #[error("Key unwrap failed: {0}")]
    KeyUnwrap(String),

    /// Content encryption failed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Content decryption failed
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Authentication tag did not verify
    #[error("Integrity check failed")]
    Integrity,

    /// Producing a nested signature failed
    #[error("Signing failed: {0}")]
    Signing(String),
}

impl CryptoError {
    /// Create a key mismatch error.
    #[must_use]
    pub fn key_mismatch(msg: impl Into<String>) -> Self {
        CryptoError::KeyMismatch(msg.into())
    }

    /// Create a key wrap error.
    #[must_use]
    pub fn key_wrap(msg: impl Into<String>) -> Self {
        CryptoError::KeyWrap(msg.into())
    }

    /// Create a key unwrap error.
    #[must_use]
    pub fn key_unwrap(msg: impl Into<String>) -> Self {
        CryptoError::KeyUnwrap(msg.into())
    }

    /// Create an encryption error.
    #[must_use]
    pub fn encryption(msg: impl Into<String>) -> Self {
        CryptoError::Encryption(msg.into())
    }

    /// Create a decryption error.
    #[must_use]
    pub fn decryption(msg: impl Into<String>) -> Self {
        CryptoError::Decryption(msg.into())
    }

    /// Create a signing error.
    #[must_use]
    pub fn signing(msg: impl Into<String>) -> Self {
        CryptoError::Signing(msg.into())
    }

    /// Create a length error.
    #[must_use]
    pub const fn invalid_length(what: &'static str, expected: usize, actual: usize) -> Self {
        CryptoError::InvalidLength {
            what,
            expected,
            actual,
        }
    }
}
