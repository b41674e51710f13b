//! JWE token produced by one encrypt or decrypt call.

use super::compact::{CompactSegments, DecodedSegments};
use super::header::JweHeader;
use super::nested::SignedJwt;
use crate::error::JweError;
use serde_json::{Map, Value};
use std::fmt;

/// Claims carried by a token, keyed by claim name.
pub type ClaimSet = Map<String, Value>;

/// A JWE together with what it was built from or resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct JweToken {
    header: JweHeader,
    segments: Option<CompactSegments>,
    claims: ClaimSet,
    nested: Option<SignedJwt>,
}

impl JweToken {
    pub(crate) fn from_parts(
        header: JweHeader,
        segments: CompactSegments,
        claims: ClaimSet,
        nested: Option<SignedJwt>,
    ) -> Self {
        Self {
            header,
            segments: Some(segments),
            claims,
            nested,
        }
    }

    /// Split a compact JWE and decode its header without decrypting.
    ///
    /// Claims stay empty. Useful for choosing a key by `kid` or `alg`.
    ///
    /// # Errors
    ///
    /// Returns a format error for a malformed token and
    /// [`JweError::UnsupportedAlgorithm`] for an unknown `alg` or `enc`.
    pub fn parse(token: &str) -> Result<Self, JweError> {
        Self::parse_decoded(token).map(|(token, _)| token)
    }

    pub(crate) fn parse_decoded(token: &str) -> Result<(Self, DecodedSegments), JweError> {
        let decoded = CompactSegments::split(token)?;
        let header = JweHeader::from_json(&decoded.header)?;
        let token = Self {
            header,
            segments: Some(decoded.encoded.clone()),
            claims: ClaimSet::new(),
            nested: None,
        };
        Ok((token, decoded))
    }

    /// Protected header.
    #[must_use]
    pub const fn header(&self) -> &JweHeader {
        &self.header
    }

    /// Resolved claims.
    #[must_use]
    pub const fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// Consume the token, keeping its claims.
    #[must_use]
    pub fn into_claims(self) -> ClaimSet {
        self.claims
    }

    /// Nested signed token, if the plaintext was one.
    #[must_use]
    pub const fn nested_payload(&self) -> Option<&SignedJwt> {
        self.nested.as_ref()
    }

    /// Encoded segments.
    #[must_use]
    pub const fn segments(&self) -> Option<&CompactSegments> {
        self.segments.as_ref()
    }

    /// Encoded protected header.
    #[must_use]
    pub fn encoded_header(&self) -> Option<&str> {
        self.segments.as_ref().map(|s| s.header.as_str())
    }

    /// Encoded encrypted key.
    #[must_use]
    pub fn encoded_encrypted_key(&self) -> Option<&str> {
        self.segments.as_ref().map(|s| s.encrypted_key.as_str())
    }

    /// Encoded initialization vector.
    #[must_use]
    pub fn encoded_iv(&self) -> Option<&str> {
        self.segments.as_ref().map(|s| s.iv.as_str())
    }

    /// Encoded ciphertext.
    #[must_use]
    pub fn encoded_ciphertext(&self) -> Option<&str> {
        self.segments.as_ref().map(|s| s.ciphertext.as_str())
    }

    /// Encoded authentication tag.
    #[must_use]
    pub fn encoded_tag(&self) -> Option<&str> {
        self.segments.as_ref().map(|s| s.tag.as_str())
    }

    /// See [`CompactSegments::additional_data`].
    #[must_use]
    pub fn additional_data(&self) -> Option<String> {
        self.segments.as_ref().map(CompactSegments::additional_data)
    }

    /// Compact serialization.
    #[must_use]
    pub fn to_compact(&self) -> Option<String> {
        self.segments.as_ref().map(CompactSegments::serialize)
    }
}

impl fmt::Display for JweToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.segments {
            Some(segments) => f.write_str(&segments.serialize()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::jwe::algorithm::{BlockEncryptionAlgorithm, KeyEncryptionAlgorithm};

    fn compact_with_header(header: &str) -> String {
        CompactSegments::encode(header.as_bytes(), b"ek", b"iv", b"ct", b"tag").serialize()
    }

    #[test]
    fn test_parse_peeks_at_header() {
        let compact = compact_with_header(r#"{"alg":"RSA1_5","enc":"A128CBC-HS256","kid":"rp-2024"}"#);
        let token = JweToken::parse(&compact).unwrap();

        assert_eq!(token.header().alg, KeyEncryptionAlgorithm::Rsa1_5);
        assert_eq!(token.header().enc, BlockEncryptionAlgorithm::A128CbcHs256);
        assert_eq!(token.header().kid.as_deref(), Some("rp-2024"));
        assert!(token.claims().is_empty());
        assert!(token.nested_payload().is_none());
        assert_eq!(token.to_compact().as_deref(), Some(compact.as_str()));
        assert_eq!(token.to_string(), compact);
    }

    #[test]
    fn test_segment_accessors() {
        let compact = compact_with_header(r#"{"alg":"A128KW","enc":"A128GCM"}"#);
        let token = JweToken::parse(&compact).unwrap();

        assert_eq!(token.encoded_encrypted_key(), Some("ZWs"));
        assert_eq!(token.encoded_iv(), Some("aXY"));
        assert_eq!(token.encoded_ciphertext(), Some("Y3Q"));
        assert_eq!(token.encoded_tag(), Some("dGFn"));
        assert_eq!(
            token.additional_data().unwrap(),
            format!("{}.ZWs.aXY", token.encoded_header().unwrap())
        );
    }

    #[test]
    fn test_parse_distinguishes_format_and_algorithm_errors() {
        let err = JweToken::parse("a.b.c").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = JweToken::parse(&compact_with_header(r#"{"alg":"dir","enc":"A128GCM"}"#)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    }
}
