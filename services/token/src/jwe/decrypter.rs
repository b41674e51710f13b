//! JWE decryption.
//!
//! Parsing and key selection failures are reported specifically. Everything
//! after that point collapses into one [`JweError::Decryption`], so a caller
//! cannot tell a wrong key from a corrupted ciphertext.

use super::algorithm::{BlockEncryptionAlgorithm, KeyEncryptionAlgorithm};
use super::nested;
use super::token::JweToken;
use crate::config::JweConfig;
use crate::crypto::{key, CryptoError, CryptoProvider, Direction, KeyMaterial, LocalCryptoProvider};
use crate::error::{JweError, JweResult};
use crate::logging::log_cek_substituted;
use crate::metrics::JweMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{field, instrument, Span};
use zeroize::Zeroizing;

/// Opens compact JWE tokens.
#[derive(Clone)]
pub struct JweDecrypter {
    provider: Arc<dyn CryptoProvider>,
    strict_profile: bool,
    expected: Option<(KeyEncryptionAlgorithm, BlockEncryptionAlgorithm)>,
    metrics: JweMetrics,
}

impl JweDecrypter {
    /// Create a decrypter over `provider` with the default policy.
    #[must_use]
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self {
            provider,
            strict_profile: false,
            expected: None,
            metrics: JweMetrics::new(),
        }
    }

    /// Create a decrypter with the policy from `config`.
    #[must_use]
    pub fn from_config(provider: Arc<dyn CryptoProvider>, config: &JweConfig) -> Self {
        let decrypter = Self::new(provider).with_strict_profile(config.strict_profile);
        match config.expected_algorithms {
            Some((alg, enc)) => decrypter.with_expected_algorithms(alg, enc),
            None => decrypter,
        }
    }

    /// Reject unsigned nested tokens.
    #[must_use]
    pub const fn with_strict_profile(mut self, strict: bool) -> Self {
        self.strict_profile = strict;
        self
    }

    /// Only accept tokens encrypted with exactly `alg` and `enc`.
    #[must_use]
    pub const fn with_expected_algorithms(mut self, alg: KeyEncryptionAlgorithm, enc: BlockEncryptionAlgorithm) -> Self {
        self.expected = Some((alg, enc));
        self
    }

    /// Whether the strict profile is on.
    #[must_use]
    pub const fn strict_profile(&self) -> bool {
        self.strict_profile
    }

    /// Decrypt `token` with `key`.
    ///
    /// # Errors
    ///
    /// - a format error or [`JweError::UnsupportedAlgorithm`] from parsing,
    ///   before any cryptographic work
    /// - [`JweError::MissingKeyMaterial`] if `key` does not fit the header `alg`
    /// - [`JweError::Decryption`] for every cryptographic failure, including
    ///   a token outside the pinned algorithms
    /// - [`JweError::PolicyViolation`] for an unsigned nested token under the
    ///   strict profile
    /// - a format error if the plaintext is neither a nested token nor a JSON
    ///   object
    #[instrument(
        skip(self, token, key),
        fields(alg = field::Empty, enc = field::Empty, kid = field::Empty, strict = self.strict_profile)
    )]
    pub fn decrypt(&self, token: &str, key: &KeyMaterial<'_>) -> JweResult<JweToken> {
        let started = Instant::now();
        let mut alg = None;
        let result = self.open(token, key, &mut alg);
        super::observe(&self.metrics, "decrypt", alg, &result, started);
        result
    }

    fn open(
        &self,
        token: &str,
        key: &KeyMaterial<'_>,
        seen_alg: &mut Option<KeyEncryptionAlgorithm>,
    ) -> JweResult<JweToken> {
        let (parsed, decoded) = JweToken::parse_decoded(token)?;
        let header = parsed.header().clone();
        *seen_alg = Some(header.alg);

        let span = Span::current();
        span.record("alg", header.alg.name());
        span.record("enc", header.enc.name());
        if let Some(kid) = header.kid.as_deref() {
            span.record("kid", kid);
        }

        let kek = key::resolve(header.alg, key, Direction::Decrypt)?;

        if let Some((alg, enc)) = self.expected {
            if alg != header.alg || enc != header.enc {
                return Err(JweError::decryption(CryptoError::AlgorithmNotAccepted(format!(
                    "expected {alg}/{enc}, token uses {}/{}",
                    header.alg, header.enc
                ))));
            }
        }

        let cek = match self.provider.unwrap_key(header.alg, &kek, &decoded.encrypted_key) {
            Ok(cek) if cek.len() == header.enc.cek_len() => cek,
            // RFC 7516 section 11.5: carry on with a random CEK so the failure
            // only shows at the tag check.
            Ok(_) | Err(_) if header.alg == KeyEncryptionAlgorithm::Rsa1_5 => {
                log_cek_substituted(header.alg);
                self.provider
                    .generate_cek(header.enc)
                    .map_err(JweError::decryption)?
            }
            Ok(cek) => cek,
            Err(cause) => return Err(JweError::decryption(cause)),
        };

        let plaintext = Zeroizing::new(
            self.provider
                .aead_decrypt(
                    header.enc,
                    &cek,
                    &decoded.iv,
                    &decoded.ciphertext,
                    &decoded.tag,
                    decoded.encoded.header.as_bytes(),
                )
                .map_err(JweError::decryption)?,
        );

        let (claims, nested) = nested::resolve(&plaintext, self.strict_profile)?.into_parts();
        Ok(JweToken::from_parts(header, decoded.encoded, claims, nested))
    }
}

impl Default for JweDecrypter {
    fn default() -> Self {
        Self::new(Arc::new(LocalCryptoProvider::new()))
    }
}

impl std::fmt::Debug for JweDecrypter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JweDecrypter")
            .field("strict_profile", &self.strict_profile)
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::jwe::encrypter::JweEncrypter;
    use crate::jwe::header::JweHeader;
    use crate::jwe::nested::SignedJwt;
    use crate::jwe::token::ClaimSet;
    use crate::jwe::JwePayload;
    use serde_json::json;

    fn claims() -> ClaimSet {
        json!({"sub": "alice", "scope": "openid", "acr": ["pwd", "otp"]})
            .as_object()
            .cloned()
            .unwrap()
    }

    fn encrypt(alg: KeyEncryptionAlgorithm, enc: BlockEncryptionAlgorithm, secret: &[u8]) -> String {
        JweEncrypter::default()
            .encrypt_claims(JweHeader::new(alg, enc), claims(), &KeyMaterial::SymmetricSecret(secret))
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_round_trip_symmetric() {
        for alg in [KeyEncryptionAlgorithm::A128Kw, KeyEncryptionAlgorithm::A256Kw] {
            for enc in BlockEncryptionAlgorithm::ALL {
                let compact = encrypt(alg, enc, b"any length secret");
                let token = JweDecrypter::default()
                    .decrypt(&compact, &KeyMaterial::SymmetricSecret(b"any length secret"))
                    .unwrap();
                assert_eq!(token.claims(), &claims(), "{alg}/{enc}");
                assert_eq!(token.to_compact(), Some(compact));
            }
        }
    }

    #[test]
    fn test_wrong_secret_is_decryption_error() {
        let compact = encrypt(KeyEncryptionAlgorithm::A256Kw, BlockEncryptionAlgorithm::A128Gcm, b"shortkey!!");
        let err = JweDecrypter::default()
            .decrypt(&compact, &KeyMaterial::SymmetricSecret(b"wrongkey!!"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decryption);
        assert_eq!(err.to_string(), "JWE decryption failed");
    }

    #[test]
    fn test_pinned_algorithms() {
        let compact = encrypt(KeyEncryptionAlgorithm::A128Kw, BlockEncryptionAlgorithm::A128Gcm, b"secret");
        let key = KeyMaterial::SymmetricSecret(b"secret");

        let pinned = JweDecrypter::default()
            .with_expected_algorithms(KeyEncryptionAlgorithm::A128Kw, BlockEncryptionAlgorithm::A128Gcm);
        assert!(pinned.decrypt(&compact, &key).is_ok());

        let pinned = JweDecrypter::default()
            .with_expected_algorithms(KeyEncryptionAlgorithm::A128Kw, BlockEncryptionAlgorithm::A256Gcm);
        let err = pinned.decrypt(&compact, &key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decryption);
    }

    #[test]
    fn test_strict_profile_from_config() {
        let nested = SignedJwt::unsecured(&claims()).unwrap();
        let key = KeyMaterial::SymmetricSecret(b"secret");
        let compact = JweEncrypter::default()
            .encrypt(
                JweHeader::new(KeyEncryptionAlgorithm::A128Kw, BlockEncryptionAlgorithm::A256CbcHs512),
                JwePayload::Nested(nested),
                &key,
            )
            .unwrap()
            .to_string();

        let config = JweConfig::default().with_strict_profile(true);
        let strict = JweDecrypter::from_config(Arc::new(LocalCryptoProvider::new()), &config);
        assert!(strict.strict_profile());
        assert_eq!(
            strict.decrypt(&compact, &key).unwrap_err().kind(),
            ErrorKind::PolicyViolation
        );

        let token = JweDecrypter::default().decrypt(&compact, &key).unwrap();
        assert_eq!(token.claims(), &claims());
        assert!(token.nested_payload().is_some_and(SignedJwt::is_unsigned));
    }

    #[test]
    fn test_format_errors_pass_through() {
        let key = KeyMaterial::SymmetricSecret(b"secret");
        let err = JweDecrypter::default().decrypt("a.b.c.d", &key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = JweDecrypter::default().decrypt("e30.a.b.c.d!", &key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
