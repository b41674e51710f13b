//! Compact serialization: five base64url segments joined by dots.

use crate::error::FormatError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

/// Number of segments in a compact JWE.
pub const JWE_SEGMENTS: usize = 5;

/// Number of segments in a compact JWS.
pub const JWS_SEGMENTS: usize = 3;

/// The five encoded segments of a compact JWE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactSegments {
    /// BASE64URL(UTF8(protected header))
    pub header: String,
    /// BASE64URL(encrypted key)
    pub encrypted_key: String,
    /// BASE64URL(initialization vector)
    pub iv: String,
    /// BASE64URL(ciphertext)
    pub ciphertext: String,
    /// BASE64URL(authentication tag)
    pub tag: String,
}

/// Split token with every segment decoded.
#[derive(Debug, Clone)]
pub struct DecodedSegments {
    /// Segments as they appeared in the token
    pub encoded: CompactSegments,
    /// Protected header JSON bytes
    pub header: Vec<u8>,
    /// Encrypted content encryption key
    pub encrypted_key: Vec<u8>,
    /// Initialization vector
    pub iv: Vec<u8>,
    /// Ciphertext
    pub ciphertext: Vec<u8>,
    /// Authentication tag
    pub tag: Vec<u8>,
}

impl CompactSegments {
    /// Encode raw segment bytes. Empty inputs become empty segments.
    #[must_use]
    pub fn encode(header_json: &[u8], encrypted_key: &[u8], iv: &[u8], ciphertext: &[u8], tag: &[u8]) -> Self {
        Self {
            header: URL_SAFE_NO_PAD.encode(header_json),
            encrypted_key: URL_SAFE_NO_PAD.encode(encrypted_key),
            iv: URL_SAFE_NO_PAD.encode(iv),
            ciphertext: URL_SAFE_NO_PAD.encode(ciphertext),
            tag: URL_SAFE_NO_PAD.encode(tag),
        }
    }

    /// Join the segments into the compact string.
    #[must_use]
    pub fn serialize(&self) -> String {
        format!(
            "{}.{}.{}.{}.{}",
            self.header, self.encrypted_key, self.iv, self.ciphertext, self.tag
        )
    }

    /// `header.encrypted_key.iv`, a fingerprint of the non-ciphertext part.
    ///
    /// This is not the AEAD additional data; only the header segment is
    /// authenticated.
    #[must_use]
    pub fn additional_data(&self) -> String {
        format!("{}.{}.{}", self.header, self.encrypted_key, self.iv)
    }

    /// Split and decode a compact JWE. The header JSON is not inspected.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::WrongSegmentCount`] unless there are exactly
    /// five segments, and [`FormatError::InvalidBase64`] naming the first
    /// segment that is not unpadded base64url.
    pub fn split(token: &str) -> Result<DecodedSegments, FormatError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != JWE_SEGMENTS {
            return Err(FormatError::WrongSegmentCount {
                expected: JWE_SEGMENTS,
                found: parts.len(),
            });
        }

        let header = decode_segment(parts[0], "header")?;
        let encrypted_key = decode_segment(parts[1], "encrypted_key")?;
        let iv = decode_segment(parts[2], "iv")?;
        let ciphertext = decode_segment(parts[3], "ciphertext")?;
        let tag = decode_segment(parts[4], "tag")?;

        Ok(DecodedSegments {
            encoded: Self {
                header: parts[0].to_string(),
                encrypted_key: parts[1].to_string(),
                iv: parts[2].to_string(),
                ciphertext: parts[3].to_string(),
                tag: parts[4].to_string(),
            },
            header,
            encrypted_key,
            iv,
            ciphertext,
            tag,
        })
    }
}

/// Decode one unpadded base64url segment.
pub(crate) fn decode_segment(part: &str, segment: &'static str) -> Result<Vec<u8>, FormatError> {
    URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| FormatError::InvalidBase64 { segment })
}

/// Shape of a compact JOSE string, by segment count alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormat {
    /// Five segments
    Encrypted,
    /// Three segments
    Signed,
    /// Anything else
    Unknown,
}

impl TokenFormat {
    /// Classify `token` without decoding it.
    #[must_use]
    pub fn detect(token: &str) -> Self {
        match token.split('.').count() {
            JWE_SEGMENTS => Self::Encrypted,
            JWS_SEGMENTS => Self::Signed,
            _ => Self::Unknown,
        }
    }
}
