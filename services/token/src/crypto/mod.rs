//! Cryptographic collaborators of the JWE engine.
//!
//! The engine never touches a cipher directly: key material is resolved in
//! [`key`] and every primitive goes through a [`CryptoProvider`], with
//! [`LocalCryptoProvider`] as the in-process default.

pub mod error;
pub mod key;
pub mod local;
pub mod provider;

// Re-exports
pub use error::CryptoError;
pub use key::{derive_symmetric_key, resolve, Direction, KeyMaterial, ResolvedKey};
pub use local::LocalCryptoProvider;
pub use provider::{AeadOutput, CryptoProvider};
