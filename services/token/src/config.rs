//! JWE engine configuration.
//!
//! Loaded from environment variables (after `.env`, if present).

use crate::jwe::algorithm::{BlockEncryptionAlgorithm, KeyEncryptionAlgorithm};
use std::env;
use thiserror::Error;

/// Enables the strict profile.
pub const ENV_STRICT_PROFILE: &str = "JWE_STRICT_PROFILE";
/// Pins the accepted key management algorithm.
pub const ENV_EXPECTED_ALG: &str = "JWE_EXPECTED_ALG";
/// Pins the accepted content encryption algorithm.
pub const ENV_EXPECTED_ENC: &str = "JWE_EXPECTED_ENC";

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// Only one of the algorithm pins is set
    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),
}

/// Decrypter policy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JweConfig {
    /// Reject unsigned nested tokens
    pub strict_profile: bool,
    /// Only accept tokens with exactly this `alg` and `enc`
    pub expected_algorithms: Option<(KeyEncryptionAlgorithm, BlockEncryptionAlgorithm)>,
}

impl JweConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value, or only one
    /// of `JWE_EXPECTED_ALG` and `JWE_EXPECTED_ENC` is set.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let strict_profile = match lookup(ENV_STRICT_PROFILE) {
            Some(value) => parse_bool(ENV_STRICT_PROFILE, &value)?,
            None => false,
        };

        let alg = lookup(ENV_EXPECTED_ALG)
            .map(|value| {
                value.parse::<KeyEncryptionAlgorithm>().map_err(|_| ConfigError::InvalidValue {
                    name: ENV_EXPECTED_ALG,
                    value,
                })
            })
            .transpose()?;
        let enc = lookup(ENV_EXPECTED_ENC)
            .map(|value| {
                value.parse::<BlockEncryptionAlgorithm>().map_err(|_| ConfigError::InvalidValue {
                    name: ENV_EXPECTED_ENC,
                    value,
                })
            })
            .transpose()?;

        let expected_algorithms = match (alg, enc) {
            (Some(alg), Some(enc)) => Some((alg, enc)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Incomplete(ENV_EXPECTED_ALG, ENV_EXPECTED_ENC)),
            (None, Some(_)) => return Err(ConfigError::Incomplete(ENV_EXPECTED_ENC, ENV_EXPECTED_ALG)),
        };

        Ok(Self {
            strict_profile,
            expected_algorithms,
        })
    }

    /// Set the strict profile.
    #[must_use]
    pub const fn with_strict_profile(mut self, strict: bool) -> Self {
        self.strict_profile = strict;
        self
    }

    /// Pin the accepted algorithms.
    #[must_use]
    pub const fn with_expected_algorithms(
        mut self,
        alg: KeyEncryptionAlgorithm,
        enc: BlockEncryptionAlgorithm,
    ) -> Self {
        self.expected_algorithms = Some((alg, enc));
        self
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}
