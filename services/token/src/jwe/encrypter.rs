//! JWE encryption.

use super::compact::CompactSegments;
use super::header::{JweHeader, NESTED_CONTENT_TYPE};
use super::nested::SignedJwt;
use super::token::{ClaimSet, JweToken};
use crate::crypto::{key, CryptoProvider, Direction, KeyMaterial, LocalCryptoProvider};
use crate::error::{FormatError, JweError, JweResult};
use crate::metrics::JweMetrics;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// What the plaintext is built from.
#[derive(Debug, Clone)]
pub enum JwePayload {
    /// Claims serialized as a JSON object
    Claims(ClaimSet),
    /// A signed token embedded verbatim
    Nested(SignedJwt),
}

/// Produces compact JWE tokens.
///
/// Holds no per-call state; share one instance across threads.
#[derive(Clone)]
pub struct JweEncrypter {
    provider: Arc<dyn CryptoProvider>,
    metrics: JweMetrics,
}

impl JweEncrypter {
    /// Create an encrypter over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self {
            provider,
            metrics: JweMetrics::new(),
        }
    }

    /// Encrypt `payload` for the holder of `key`.
    ///
    /// A nested payload sets `cty` to `JWT`. Every call uses a fresh CEK and
    /// IV, so encrypting the same input twice yields different tokens.
    ///
    /// # Errors
    ///
    /// - [`JweError::MissingKeyMaterial`] if `key` does not fit `header.alg`
    /// - [`JweError::UnsupportedAlgorithm`] if the provider lacks the algorithm
    /// - [`JweError::Encryption`] for any other provider failure
    #[instrument(
        skip(self, header, payload, key),
        fields(alg = %header.alg, enc = %header.enc, kid = header.kid.as_deref().unwrap_or("-"))
    )]
    pub fn encrypt(&self, header: JweHeader, payload: JwePayload, key: &KeyMaterial<'_>) -> JweResult<JweToken> {
        let started = Instant::now();
        let alg = header.alg;
        let result = self.seal(header, payload, key);
        super::observe(&self.metrics, "encrypt", Some(alg), &result, started);
        result
    }

    /// Encrypt a claims set.
    ///
    /// # Errors
    ///
    /// See [`JweEncrypter::encrypt`].
    pub fn encrypt_claims(&self, header: JweHeader, claims: ClaimSet, key: &KeyMaterial<'_>) -> JweResult<JweToken> {
        self.encrypt(header, JwePayload::Claims(claims), key)
    }

    fn seal(&self, mut header: JweHeader, payload: JwePayload, key: &KeyMaterial<'_>) -> JweResult<JweToken> {
        let (plaintext, claims, nested) = match payload {
            JwePayload::Claims(claims) => {
                let plaintext =
                    serde_json::to_vec(&claims).map_err(|e| FormatError::InvalidPayload(e.to_string()))?;
                (plaintext, claims, None)
            }
            JwePayload::Nested(jwt) => {
                header.cty = Some(NESTED_CONTENT_TYPE.to_string());
                (jwt.as_str().as_bytes().to_vec(), jwt.claims().clone(), Some(jwt))
            }
        };

        let kek = key::resolve(header.alg, key, Direction::Encrypt)?;

        let header_json = header.to_json()?;
        let aad = URL_SAFE_NO_PAD.encode(&header_json);

        let cek = self
            .provider
            .generate_cek(header.enc)
            .map_err(JweError::encryption)?;
        let encrypted_key = self
            .provider
            .wrap_key(header.alg, &kek, &cek)
            .map_err(JweError::encryption)?;
        let sealed = self
            .provider
            .aead_encrypt(header.enc, &cek, &plaintext, aad.as_bytes())
            .map_err(JweError::encryption)?;

        let segments = CompactSegments::encode(
            &header_json,
            &encrypted_key,
            &sealed.iv,
            &sealed.ciphertext,
            &sealed.tag,
        );
        Ok(JweToken::from_parts(header, segments, claims, nested))
    }
}

impl Default for JweEncrypter {
    fn default() -> Self {
        Self::new(Arc::new(LocalCryptoProvider::new()))
    }
}

impl std::fmt::Debug for JweEncrypter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JweEncrypter").finish_non_exhaustive()
    }
}
