//! In-process crypto provider.
//!
//! Stateless: ciphers are built per call from the key handed in, so a single
//! instance can be shared by every encrypter and decrypter.

use super::error::CryptoError;
use super::key::ResolvedKey;
use super::provider::{AeadOutput, CryptoProvider};
use crate::jwe::algorithm::{BlockEncryptionAlgorithm, KeyEncryptionAlgorithm};
use aes::{Aes128, Aes256};
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use aes_kw::{KekAes128, KekAes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use ring::hmac;
use rsa::{Oaep, Pkcs1v15Encrypt};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Default [`CryptoProvider`] backed by RustCrypto ciphers and ring HMAC.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCryptoProvider;

impl LocalCryptoProvider {
    /// Create a new provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CryptoProvider for LocalCryptoProvider {
    fn wrap_key(
        &self,
        alg: KeyEncryptionAlgorithm,
        kek: &ResolvedKey<'_>,
        cek: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let mut rng = rand::thread_rng();
        match (alg, kek) {
            (KeyEncryptionAlgorithm::Rsa1_5, ResolvedKey::Public(key)) => key
                .encrypt(&mut rng, Pkcs1v15Encrypt, cek)
                .map_err(|e| CryptoError::key_wrap(e.to_string())),
            (KeyEncryptionAlgorithm::RsaOaep, ResolvedKey::Public(key)) => key
                .encrypt(&mut rng, Oaep::new::<sha1::Sha1>(), cek)
                .map_err(|e| CryptoError::key_wrap(e.to_string())),
            (KeyEncryptionAlgorithm::A128Kw, ResolvedKey::Symmetric(bytes)) => {
                check_len("key encryption key", 16, bytes.len())?;
                KekAes128::new(GenericArray::from_slice(bytes.as_slice()))
                    .wrap_vec(cek)
                    .map_err(|e| CryptoError::key_wrap(e.to_string()))
            }
            (KeyEncryptionAlgorithm::A256Kw, ResolvedKey::Symmetric(bytes)) => {
                check_len("key encryption key", 32, bytes.len())?;
                KekAes256::new(GenericArray::from_slice(bytes.as_slice()))
                    .wrap_vec(cek)
                    .map_err(|e| CryptoError::key_wrap(e.to_string()))
            }
            (alg, _) => Err(CryptoError::key_mismatch(format!(
                "{alg} cannot wrap with the supplied key"
            ))),
        }
    }

    fn unwrap_key(
        &self,
        alg: KeyEncryptionAlgorithm,
        kek: &ResolvedKey<'_>,
        wrapped: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let cek = match (alg, kek) {
            (KeyEncryptionAlgorithm::Rsa1_5, ResolvedKey::Private(key)) => key
                .decrypt(Pkcs1v15Encrypt, wrapped)
                .map_err(|e| CryptoError::key_unwrap(e.to_string()))?,
            (KeyEncryptionAlgorithm::RsaOaep, ResolvedKey::Private(key)) => key
                .decrypt(Oaep::new::<sha1::Sha1>(), wrapped)
                .map_err(|e| CryptoError::key_unwrap(e.to_string()))?,
            (KeyEncryptionAlgorithm::A128Kw, ResolvedKey::Symmetric(bytes)) => {
                check_len("key encryption key", 16, bytes.len())?;
                KekAes128::new(GenericArray::from_slice(bytes.as_slice()))
                    .unwrap_vec(wrapped)
                    .map_err(|e| CryptoError::key_unwrap(e.to_string()))?
            }
            (KeyEncryptionAlgorithm::A256Kw, ResolvedKey::Symmetric(bytes)) => {
                check_len("key encryption key", 32, bytes.len())?;
                KekAes256::new(GenericArray::from_slice(bytes.as_slice()))
                    .unwrap_vec(wrapped)
                    .map_err(|e| CryptoError::key_unwrap(e.to_string()))?
            }
            (alg, _) => {
                return Err(CryptoError::key_mismatch(format!(
                    "{alg} cannot unwrap with the supplied key"
                )))
            }
        };
        Ok(Zeroizing::new(cek))
    }

    fn aead_encrypt(
        &self,
        enc: BlockEncryptionAlgorithm,
        cek: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<AeadOutput, CryptoError> {
        check_len("cek", enc.cek_len(), cek.len())?;

        let mut iv = vec![0u8; enc.iv_len()];
        rand::thread_rng().fill_bytes(&mut iv);

        match enc {
            BlockEncryptionAlgorithm::A128Gcm => gcm_seal::<Aes128Gcm>(cek, iv, plaintext, aad),
            BlockEncryptionAlgorithm::A256Gcm => gcm_seal::<Aes256Gcm>(cek, iv, plaintext, aad),
            BlockEncryptionAlgorithm::A128CbcHs256 | BlockEncryptionAlgorithm::A256CbcHs512 => {
                let (mac_key, enc_key) = cek.split_at(cek.len() / 2);
                let ciphertext = match enc {
                    BlockEncryptionAlgorithm::A128CbcHs256 => {
                        cbc::Encryptor::<Aes128>::new_from_slices(enc_key, &iv)
                            .map_err(|e| CryptoError::encryption(e.to_string()))?
                            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
                    }
                    _ => cbc::Encryptor::<Aes256>::new_from_slices(enc_key, &iv)
                        .map_err(|e| CryptoError::encryption(e.to_string()))?
                        .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
                };
                let tag = cbc_hmac_tag(enc, mac_key, aad, &iv, &ciphertext);
                Ok(AeadOutput {
                    iv,
                    ciphertext,
                    tag,
                })
            }
        }
    }

    fn aead_decrypt(
        &self,
        enc: BlockEncryptionAlgorithm,
        cek: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        check_len("cek", enc.cek_len(), cek.len())?;
        check_len("iv", enc.iv_len(), iv.len())?;
        check_len("tag", enc.tag_len(), tag.len())?;

        match enc {
            BlockEncryptionAlgorithm::A128Gcm => gcm_open::<Aes128Gcm>(cek, iv, ciphertext, tag, aad),
            BlockEncryptionAlgorithm::A256Gcm => gcm_open::<Aes256Gcm>(cek, iv, ciphertext, tag, aad),
            BlockEncryptionAlgorithm::A128CbcHs256 | BlockEncryptionAlgorithm::A256CbcHs512 => {
                let (mac_key, enc_key) = cek.split_at(cek.len() / 2);

                // Tag first: never run the padding oracle on unauthenticated input.
                let expected = cbc_hmac_tag(enc, mac_key, aad, iv, ciphertext);
                if !bool::from(expected.as_slice().ct_eq(tag)) {
                    return Err(CryptoError::Integrity);
                }

                let plaintext = match enc {
                    BlockEncryptionAlgorithm::A128CbcHs256 => {
                        cbc::Decryptor::<Aes128>::new_from_slices(enc_key, iv)
                            .map_err(|e| CryptoError::decryption(e.to_string()))?
                            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                    }
                    _ => cbc::Decryptor::<Aes256>::new_from_slices(enc_key, iv)
                        .map_err(|e| CryptoError::decryption(e.to_string()))?
                        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
                };
                plaintext.map_err(|_| CryptoError::decryption("invalid padding"))
            }
        }
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), CryptoError> {
    if expected == actual {
        Ok(())
    } else {
        Err(CryptoError::invalid_length(what, expected, actual))
    }
}

fn gcm_seal<C>(cek: &[u8], iv: Vec<u8>, plaintext: &[u8], aad: &[u8]) -> Result<AeadOutput, CryptoError>
where
    C: Aead + KeyInit,
{
    let cipher = C::new_from_slice(cek).map_err(|e| CryptoError::encryption(e.to_string()))?;
    let sealed = cipher
        .encrypt(GenericArray::from_slice(&iv), Payload { msg: plaintext, aad })
        .map_err(|e| CryptoError::encryption(e.to_string()))?;

    // Split ciphertext and tag (last 16 bytes is tag)
    let tag_start = sealed.len().saturating_sub(16);
    let (ciphertext, tag) = sealed.split_at(tag_start);

    Ok(AeadOutput {
        iv,
        ciphertext: ciphertext.to_vec(),
        tag: tag.to_vec(),
    })
}

fn gcm_open<C>(
    cek: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError>
where
    C: Aead + KeyInit,
{
    let cipher = C::new_from_slice(cek).map_err(|e| CryptoError::decryption(e.to_string()))?;

    let mut sealed = Vec::with_capacity(ciphertext.len() + tag.len());
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(GenericArray::from_slice(iv), Payload { msg: &sealed, aad })
        .map_err(|_| CryptoError::Integrity)
}

/// RFC 7518 section 5.2.2.1 authentication tag.
fn cbc_hmac_tag(
    enc: BlockEncryptionAlgorithm,
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Vec<u8> {
    let algorithm = match enc {
        BlockEncryptionAlgorithm::A256CbcHs512 => hmac::HMAC_SHA512,
        _ => hmac::HMAC_SHA256,
    };
    let key = hmac::Key::new(algorithm, mac_key);
    let aad_bits = (aad.len() as u64).wrapping_mul(8).to_be_bytes();

    let mut ctx = hmac::Context::with_key(&key);
    ctx.update(aad);
    ctx.update(iv);
    ctx.update(ciphertext);
    ctx.update(&aad_bits);
    let signature = ctx.sign();

    signature.as_ref()[..enc.tag_len()].to_vec()
}
