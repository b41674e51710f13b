//! Error types for JWE processing.
//!
//! Every failure is terminal for the call. Cryptographic failures carry their
//! cause as `source()` for internal diagnostics only; their `Display` text is
//! generic.

use crate::crypto::CryptoError;
use thiserror::Error;

/// Malformed compact serialization or undecodable content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The compact string did not split into the expected number of segments.
    #[error("wrong number of segments: expected {expected}, found {found}")]
    WrongSegmentCount {
        /// Segments required by the format
        expected: usize,
        /// Segments actually present
        found: usize,
    },

    /// A segment is not valid unpadded base64url.
    #[error("invalid base64url segment: {segment}")]
    InvalidBase64 {
        /// Name of the offending segment
        segment: &'static str,
    },

    /// The protected header is not a UTF-8 JSON object.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The plaintext is neither a nested signed token nor a JSON object.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Errors surfaced by the JWE engine.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JweError {
    /// Malformed token or plaintext
    #[error("Malformed JWE: {0}")]
    Format(#[from] FormatError),

    /// Algorithm outside the supported enumerations
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// No key, or a key of the wrong kind, for the algorithm and direction
    #[error("Missing key material: {0}")]
    MissingKeyMaterial(String),

    /// Provider-level encryption failure
    #[error("JWE encryption failed")]
    Encryption {
        /// Underlying provider failure, for internal logs only
        #[source]
        cause: CryptoError,
    },

    /// Provider-level decryption failure
    #[error("JWE decryption failed")]
    Decryption {
        /// Underlying provider failure, for internal logs only
        #[source]
        cause: CryptoError,
    },

    /// Nested-token policy rejected the payload
    #[error("Policy violation: {0}")]
    PolicyViolation(String),
}

/// Discriminant of [`JweError`] for mapping onto protocol responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// [`JweError::Format`]
    Format,
    /// [`JweError::UnsupportedAlgorithm`]
    UnsupportedAlgorithm,
    /// [`JweError::MissingKeyMaterial`]
    MissingKeyMaterial,
    /// [`JweError::Encryption`]
    Encryption,
    /// [`JweError::Decryption`]
    Decryption,
    /// [`JweError::PolicyViolation`]
    PolicyViolation,
}

impl ErrorKind {
    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Format => JWE_FORMAT_ERROR,
            Self::UnsupportedAlgorithm => JWE_UNSUPPORTED_ALGORITHM,
            Self::MissingKeyMaterial => JWE_MISSING_KEY_MATERIAL,
            Self::Encryption => JWE_ENCRYPTION_ERROR,
            Self::Decryption => JWE_DECRYPTION_ERROR,
            Self::PolicyViolation => JWE_POLICY_VIOLATION,
        }
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "format_error",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::MissingKeyMaterial => "missing_key_material",
            Self::Encryption => "encryption_error",
            Self::Decryption => "decryption_error",
            Self::PolicyViolation => "policy_violation",
        }
    }
}

impl JweError {
    /// Get the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Format(_) => ErrorKind::Format,
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::MissingKeyMaterial(_) => ErrorKind::MissingKeyMaterial,
            Self::Encryption { .. } => ErrorKind::Encryption,
            Self::Decryption { .. } => ErrorKind::Decryption,
            Self::PolicyViolation(_) => ErrorKind::PolicyViolation,
        }
    }

    /// None of the JWE failures are transient.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// Whether the specific message may be shown to an untrusted caller.
    #[must_use]
    pub const fn is_safe_to_report(&self) -> bool {
        !matches!(self, Self::Encryption { .. } | Self::Decryption { .. })
    }

    /// Message suitable for an external error response.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_safe_to_report() {
            self.to_string()
        } else {
            match self.kind() {
                ErrorKind::Encryption => "Unable to encrypt token".to_string(),
                _ => "Unable to decrypt token".to_string(),
            }
        }
    }

    /// Create an unsupported algorithm error.
    #[must_use]
    pub fn unsupported(name: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(name.into())
    }

    /// Create a missing key material error.
    #[must_use]
    pub fn missing_key(msg: impl Into<String>) -> Self {
        Self::MissingKeyMaterial(msg.into())
    }

    /// Create a policy violation error.
    #[must_use]
    pub fn policy(msg: impl Into<String>) -> Self {
        Self::PolicyViolation(msg.into())
    }

    /// Wrap a provider failure raised while encrypting.
    ///
    /// A provider that does not implement the algorithm is reported as
    /// [`JweError::UnsupportedAlgorithm`].
    #[must_use]
    pub fn encryption(cause: CryptoError) -> Self {
        match cause {
            CryptoError::UnsupportedAlgorithm(name) => Self::UnsupportedAlgorithm(name),
            cause => Self::Encryption { cause },
        }
    }

    /// Wrap a provider failure raised while decrypting.
    #[must_use]
    pub const fn decryption(cause: CryptoError) -> Self {
        Self::Decryption { cause }
    }
}

/// Result type for JWE operations.
pub type JweResult<T> = Result<T, JweError>;

// Error codes for protocol responses
/// Malformed token or plaintext
pub const JWE_FORMAT_ERROR: &str = "JWE_FORMAT_ERROR";
/// Unknown `alg` or `enc`
pub const JWE_UNSUPPORTED_ALGORITHM: &str = "JWE_UNSUPPORTED_ALGORITHM";
/// Missing or wrong kind of key
pub const JWE_MISSING_KEY_MATERIAL: &str = "JWE_MISSING_KEY_MATERIAL";
/// Encryption failed
pub const JWE_ENCRYPTION_ERROR: &str = "JWE_ENCRYPTION_ERROR";
/// Decryption failed
pub const JWE_DECRYPTION_ERROR: &str = "JWE_DECRYPTION_ERROR";
/// Nested token rejected by policy
pub const JWE_POLICY_VIOLATION: &str = "JWE_POLICY_VIOLATION";
