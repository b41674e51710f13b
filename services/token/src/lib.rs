//! Token Service JWE engine.
//!
//! Encrypts claims sets or nested signed tokens into compact JWE and opens
//! them again. Cryptographic primitives sit behind
//! [`CryptoProvider`](crypto::CryptoProvider).
//!
//! ```no_run
//! use token_jwe::crypto::KeyMaterial;
//! use token_jwe::jwe::{BlockEncryptionAlgorithm, JweDecrypter, JweEncrypter, JweHeader, KeyEncryptionAlgorithm};
//!
//! let claims = serde_json::json!({"sub": "alice"}).as_object().cloned().unwrap_or_default();
//! let key = KeyMaterial::SymmetricSecret(b"shortkey!!");
//! let header = JweHeader::new(KeyEncryptionAlgorithm::A256Kw, BlockEncryptionAlgorithm::A128Gcm);
//!
//! let token = JweEncrypter::default().encrypt_claims(header, claims, &key)?;
//! let opened = JweDecrypter::default().decrypt(&token.to_string(), &key)?;
//! assert_eq!(opened.claims(), token.claims());
//! # Ok::<(), token_jwe::JweError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod jwe;
pub mod logging;
pub mod metrics;

// Re-exports for convenience
pub use config::JweConfig;
pub use error::{ErrorKind, FormatError, JweError, JweResult};
pub use jwe::{JweDecrypter, JweEncrypter, JweHeader, JweToken};
