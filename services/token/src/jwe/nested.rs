//! Nested signed tokens carried as JWE plaintext.
//!
//! Signatures are never verified here. [`SignedJwt`] exposes the signing
//! input and signature so the caller can verify against the sender's key.

use super::compact::{decode_segment, JWS_SEGMENTS};
use super::token::ClaimSet;
use crate::crypto::CryptoError;
use crate::error::{FormatError, JweError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JWS `alg` value of an unsecured token.
pub const UNSECURED_ALGORITHM: &str = "none";

const UNSIGNED_NOT_PERMITTED: &str = "unsigned nested token not permitted under strict profile";

/// Header of a nested JWS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Signature algorithm, kept verbatim
    pub alg: String,
    /// Token type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Signing key id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Content type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
}

/// A parsed, unverified compact JWS.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedJwt {
    compact: String,
    header: JwsHeader,
    claims: ClaimSet,
    signature: Vec<u8>,
}

impl SignedJwt {
    /// Parse a compact JWS without verifying its signature.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] unless the token has three segments, a JSON
    /// object header with a string `alg`, a JSON object payload and a
    /// base64url signature (possibly empty).
    pub fn parse(token: &str) -> Result<Self, JweError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != JWS_SEGMENTS {
            return Err(FormatError::WrongSegmentCount {
                expected: JWS_SEGMENTS,
                found: parts.len(),
            }
            .into());
        }

        let header = match serde_json::from_slice::<Value>(&decode_segment(parts[0], "jws header")?) {
            Ok(value @ Value::Object(_)) => serde_json::from_value::<JwsHeader>(value)
                .map_err(|e| FormatError::InvalidHeader(e.to_string()))?,
            Ok(_) => return Err(FormatError::InvalidHeader("jws header is not a JSON object".to_string()).into()),
            Err(e) => return Err(FormatError::InvalidHeader(e.to_string()).into()),
        };

        let claims = match serde_json::from_slice::<Value>(&decode_segment(parts[1], "jws payload")?) {
            Ok(Value::Object(claims)) => claims,
            Ok(_) => return Err(FormatError::InvalidPayload("jws payload is not a JSON object".to_string()).into()),
            Err(e) => return Err(FormatError::InvalidPayload(e.to_string()).into()),
        };

        let signature = decode_segment(parts[2], "jws signature")?;

        Ok(Self {
            compact: token.to_string(),
            header,
            claims,
            signature,
        })
    }

    /// Sign `claims` with `jsonwebtoken`.
    ///
    /// # Errors
    ///
    /// Returns [`JweError::Encryption`] if the key cannot sign with `algorithm`.
    pub fn sign(
        claims: &ClaimSet,
        algorithm: Algorithm,
        key: &EncodingKey,
        kid: Option<&str>,
    ) -> Result<Self, JweError> {
        let mut header = Header::new(algorithm);
        header.kid = kid.map(str::to_string);

        let token = jsonwebtoken::encode(&header, claims, key)
            .map_err(|e| JweError::encryption(CryptoError::signing(e.to_string())))?;
        Self::parse(&token)
    }

    /// Build an unsecured (`alg: none`) token carrying `claims`.
    ///
    /// # Errors
    ///
    /// Returns a format error if the claims cannot be serialized.
    pub fn unsecured(claims: &ClaimSet) -> Result<Self, JweError> {
        let header = JwsHeader {
            alg: UNSECURED_ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
            kid: None,
            cty: None,
        };
        let header = serde_json::to_vec(&header).map_err(|e| FormatError::InvalidHeader(e.to_string()))?;
        let payload = serde_json::to_vec(claims).map_err(|e| FormatError::InvalidPayload(e.to_string()))?;

        Self::parse(&format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        ))
    }

    /// The compact string as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.compact
    }

    /// Decoded header.
    #[must_use]
    pub const fn header(&self) -> &JwsHeader {
        &self.header
    }

    /// Signature algorithm named by the header.
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.header.alg
    }

    /// Signing key id, if any.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.header.kid.as_deref()
    }

    /// Claims from the payload segment.
    #[must_use]
    pub const fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// Raw signature bytes.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// `header.payload`, the bytes the signature covers.
    #[must_use]
    pub fn signing_input(&self) -> &str {
        self.compact
            .rfind('.')
            .map_or(self.compact.as_str(), |end| &self.compact[..end])
    }

    /// Signature segment as it appeared in the token.
    #[must_use]
    pub fn encoded_signature(&self) -> &str {
        self.compact
            .rfind('.')
            .map_or("", |end| &self.compact[end + 1..])
    }

    /// Whether the token declares the `none` algorithm.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.header.alg.eq_ignore_ascii_case(UNSECURED_ALGORITHM)
    }
}

/// Outcome of interpreting a decrypted plaintext.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPayload {
    /// Plain JSON claims object
    Claims(ClaimSet),
    /// Nested signed token and the claims it carries
    Nested {
        /// The nested token
        jwt: SignedJwt,
        /// Claims taken from its payload
        claims: ClaimSet,
    },
}

impl ResolvedPayload {
    /// Split into claims and the nested token, if any.
    #[must_use]
    pub fn into_parts(self) -> (ClaimSet, Option<SignedJwt>) {
        match self {
            Self::Claims(claims) => (claims, None),
            Self::Nested { jwt, claims } => (claims, Some(jwt)),
        }
    }
}

/// Interpret decrypted `plaintext` as a nested JWS or a JSON claims object.
///
/// # Errors
///
/// Returns [`JweError::PolicyViolation`] for an unsigned nested token when
/// `strict_profile` is set, and [`FormatError::InvalidPayload`] when the
/// plaintext is neither a nested token nor a JSON object.
pub fn resolve(plaintext: &[u8], strict_profile: bool) -> Result<ResolvedPayload, JweError> {
    if let Some(jwt) = std::str::from_utf8(plaintext)
        .ok()
        .and_then(|text| SignedJwt::parse(text).ok())
    {
        if strict_profile && jwt.is_unsigned() {
            return Err(JweError::policy(UNSIGNED_NOT_PERMITTED));
        }
        let claims = jwt.claims().clone();
        return Ok(ResolvedPayload::Nested { jwt, claims });
    }

    match serde_json::from_slice::<Value>(plaintext) {
        Ok(Value::Object(claims)) => Ok(ResolvedPayload::Claims(claims)),
        Ok(_) => Err(FormatError::InvalidPayload("plaintext is not a JSON object".to_string()).into()),
        Err(e) => Err(FormatError::InvalidPayload(e.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use jsonwebtoken::DecodingKey;
    use serde_json::json;

    fn claims() -> ClaimSet {
        json!({"sub": "alice", "scope": "openid"}).as_object().cloned().unwrap()
    }

    #[test]
    fn test_signed_token_exposes_verification_inputs() {
        let jwt = SignedJwt::sign(&claims(), Algorithm::HS256, &EncodingKey::from_secret(b"client-secret"), Some("c1"))
            .unwrap();

        assert_eq!(jwt.algorithm(), "HS256");
        assert_eq!(jwt.key_id(), Some("c1"));
        assert_eq!(jwt.claims(), &claims());
        assert!(!jwt.is_unsigned());
        assert_eq!(
            format!("{}.{}", jwt.signing_input(), jwt.encoded_signature()),
            jwt.as_str()
        );

        let verified = jsonwebtoken::crypto::verify(
            jwt.encoded_signature(),
            jwt.signing_input().as_bytes(),
            &DecodingKey::from_secret(b"client-secret"),
            Algorithm::HS256,
        )
        .unwrap();
        assert!(verified);
    }

    #[test]
    fn test_unsecured_token() {
        let jwt = SignedJwt::unsecured(&claims()).unwrap();
        assert!(jwt.is_unsigned());
        assert!(jwt.signature().is_empty());
        assert!(jwt.as_str().ends_with('.'));
        assert_eq!(jwt.encoded_signature(), "");
    }

    #[test]
    fn test_parse_rejects_malformed_tokens() {
        for token in ["a.b", "a.b.c.d", "e30.e30", "WzFd.e30.", "e30.e30.", "eyJhbGciOiJub25lIn0.WzFd."] {
            let err = SignedJwt::parse(token).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "{token}");
        }
    }

    #[test]
    fn test_resolve_plain_claims() {
        let plaintext = serde_json::to_vec(&claims()).unwrap();
        let resolved = resolve(&plaintext, true).unwrap();
        assert_eq!(resolved, ResolvedPayload::Claims(claims()));
    }

    #[test]
    fn test_resolve_unsigned_nested_depends_on_profile() {
        let jwt = SignedJwt::unsecured(&claims()).unwrap();

        let err = resolve(jwt.as_str().as_bytes(), true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PolicyViolation);
        assert_eq!(
            err.to_string(),
            "Policy violation: unsigned nested token not permitted under strict profile"
        );

        let (resolved, nested) = resolve(jwt.as_str().as_bytes(), false).unwrap().into_parts();
        assert_eq!(resolved, claims());
        assert_eq!(nested, Some(jwt));
    }

    #[test]
    fn test_resolve_rejects_non_object_plaintext() {
        let inputs: [&[u8]; 4] = [b"[1,2,3]", b"\"alice\"", b"not json", b""];
        for plaintext in inputs {
            let err = resolve(plaintext, false).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format);
        }
    }
}
