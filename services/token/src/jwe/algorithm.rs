//! JWA identifiers for key management and content encryption.

use crate::error::JweError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key family an algorithm operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// RSA key pair
    Rsa,
    /// Shared symmetric secret
    Aes,
}

/// Key management algorithm (`alg` header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyEncryptionAlgorithm {
    /// RSAES-PKCS1-v1_5
    #[serde(rename = "RSA1_5")]
    Rsa1_5,
    /// RSAES OAEP using SHA-1 and MGF1 with SHA-1
    #[serde(rename = "RSA-OAEP")]
    RsaOaep,
    /// AES Key Wrap with a 128-bit key
    #[serde(rename = "A128KW")]
    A128Kw,
    /// AES Key Wrap with a 256-bit key
    #[serde(rename = "A256KW")]
    A256Kw,
}

impl KeyEncryptionAlgorithm {
    /// Every supported key management algorithm.
    pub const ALL: [Self; 4] = [Self::Rsa1_5, Self::RsaOaep, Self::A128Kw, Self::A256Kw];

    /// JOSE identifier.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rsa1_5 => "RSA1_5",
            Self::RsaOaep => "RSA-OAEP",
            Self::A128Kw => "A128KW",
            Self::A256Kw => "A256KW",
        }
    }

    /// Key family the algorithm needs.
    #[must_use]
    pub const fn family(&self) -> AlgorithmFamily {
        match self {
            Self::Rsa1_5 | Self::RsaOaep => AlgorithmFamily::Rsa,
            Self::A128Kw | Self::A256Kw => AlgorithmFamily::Aes,
        }
    }

    /// Exact key-encryption-key length for the AES family.
    #[must_use]
    pub const fn required_key_len(&self) -> Option<usize> {
        match self {
            Self::A128Kw => Some(16),
            Self::A256Kw => Some(32),
            Self::Rsa1_5 | Self::RsaOaep => None,
        }
    }
}

impl FromStr for KeyEncryptionAlgorithm {
    type Err = JweError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == s)
            .ok_or_else(|| JweError::unsupported(format!("alg {s}")))
    }
}

impl fmt::Display for KeyEncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content encryption algorithm (`enc` header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockEncryptionAlgorithm {
    /// AES-GCM with a 128-bit key
    #[serde(rename = "A128GCM")]
    A128Gcm,
    /// AES-GCM with a 256-bit key
    #[serde(rename = "A256GCM")]
    A256Gcm,
    /// AES-128-CBC with HMAC-SHA-256 truncated to 128 bits
    #[serde(rename = "A128CBC-HS256")]
    A128CbcHs256,
    /// AES-256-CBC with HMAC-SHA-512 truncated to 256 bits
    #[serde(rename = "A256CBC-HS512")]
    A256CbcHs512,
}

impl BlockEncryptionAlgorithm {
    /// Every supported content encryption algorithm.
    pub const ALL: [Self; 4] = [
        Self::A128Gcm,
        Self::A256Gcm,
        Self::A128CbcHs256,
        Self::A256CbcHs512,
    ];

    /// JOSE identifier.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::A128Gcm => "A128GCM",
            Self::A256Gcm => "A256GCM",
            Self::A128CbcHs256 => "A128CBC-HS256",
            Self::A256CbcHs512 => "A256CBC-HS512",
        }
    }

    /// Content encryption key length in bytes.
    ///
    /// The CBC-HMAC composites carry the MAC key and the encryption key
    /// concatenated.
    #[must_use]
    pub const fn cek_len(&self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A256Gcm | Self::A128CbcHs256 => 32,
            Self::A256CbcHs512 => 64,
        }
    }

    /// Initialization vector length in bytes.
    #[must_use]
    pub const fn iv_len(&self) -> usize {
        match self {
            Self::A128Gcm | Self::A256Gcm => 12,
            Self::A128CbcHs256 | Self::A256CbcHs512 => 16,
        }
    }

    /// Authentication tag length in bytes.
    #[must_use]
    pub const fn tag_len(&self) -> usize {
        match self {
            Self::A128Gcm | Self::A256Gcm | Self::A128CbcHs256 => 16,
            Self::A256CbcHs512 => 32,
        }
    }
}

impl FromStr for BlockEncryptionAlgorithm {
    type Err = JweError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|enc| enc.name() == s)
            .ok_or_else(|| JweError::unsupported(format!("enc {s}")))
    }
}

impl fmt::Display for BlockEncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
