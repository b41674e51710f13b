//! JOSE protected header of a JWE.

use super::algorithm::{BlockEncryptionAlgorithm, KeyEncryptionAlgorithm};
use crate::error::{FormatError, JweError};
use serde::Serialize;
use serde_json::{Map, Value};

/// Content type marking a nested signed token.
pub const NESTED_CONTENT_TYPE: &str = "JWT";

/// JWE protected header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JweHeader {
    /// Key management algorithm
    pub alg: KeyEncryptionAlgorithm,
    /// Content encryption algorithm
    pub enc: BlockEncryptionAlgorithm,
    /// Content type of the plaintext
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
    /// Media type of the complete token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Identifier of the key encryption key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl JweHeader {
    /// Create a header carrying only `alg` and `enc`.
    #[must_use]
    pub const fn new(alg: KeyEncryptionAlgorithm, enc: BlockEncryptionAlgorithm) -> Self {
        Self {
            alg,
            enc,
            cty: None,
            typ: None,
            kid: None,
        }
    }

    /// Set the key id.
    #[must_use]
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Set the token type.
    #[must_use]
    pub fn with_type(mut self, typ: impl Into<String>) -> Self {
        self.typ = Some(typ.into());
        self
    }

    /// Set the content type.
    #[must_use]
    pub fn with_content_type(mut self, cty: impl Into<String>) -> Self {
        self.cty = Some(cty.into());
        self
    }

    /// Whether the plaintext is declared to be a nested signed token.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.cty
            .as_deref()
            .is_some_and(|cty| cty.eq_ignore_ascii_case(NESTED_CONTENT_TYPE))
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns a format error if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, JweError> {
        serde_json::to_vec(self).map_err(|e| FormatError::InvalidHeader(e.to_string()).into())
    }

    /// Decode a header from its JSON bytes.
    ///
    /// Unknown members are ignored. A missing or unrecognized `alg` or `enc`
    /// is an [`JweError::UnsupportedAlgorithm`], not a format error.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidHeader`] when the bytes are not a UTF-8
    /// JSON object or an optional member is not a string.
    pub fn from_json(bytes: &[u8]) -> Result<Self, JweError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| FormatError::InvalidHeader(e.to_string()))?;
        let Value::Object(members) = value else {
            return Err(FormatError::InvalidHeader("header is not a JSON object".to_string()).into());
        };

        let alg = required_algorithm(&members, "alg")?.parse::<KeyEncryptionAlgorithm>()?;
        let enc = required_algorithm(&members, "enc")?.parse::<BlockEncryptionAlgorithm>()?;

        Ok(Self {
            alg,
            enc,
            cty: optional_string(&members, "cty")?,
            typ: optional_string(&members, "typ")?,
            kid: optional_string(&members, "kid")?,
        })
    }
}

fn required_algorithm<'a>(members: &'a Map<String, Value>, name: &str) -> Result<&'a str, JweError> {
    match members.get(name) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(JweError::unsupported(format!("{name} is not a string"))),
        None => Err(JweError::unsupported(format!("missing {name}"))),
    }
}

fn optional_string(members: &Map<String, Value>, name: &str) -> Result<Option<String>, JweError> {
    match members.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(FormatError::InvalidHeader(format!("{name} is not a string")).into()),
    }
}
