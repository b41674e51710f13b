//! JWE compact serialization, encryption and decryption.

pub mod algorithm;
pub mod compact;
pub mod decrypter;
pub mod encrypter;
pub mod header;
pub mod nested;
pub mod token;

pub use algorithm::{AlgorithmFamily, BlockEncryptionAlgorithm, KeyEncryptionAlgorithm};
pub use compact::{CompactSegments, DecodedSegments, TokenFormat};
pub use decrypter::JweDecrypter;
pub use encrypter::{JweEncrypter, JwePayload};
pub use header::JweHeader;
pub use nested::{JwsHeader, ResolvedPayload, SignedJwt};
pub use token::{ClaimSet, JweToken};

use crate::error::JweResult;
use crate::logging::{log_jwe_error, log_jwe_operation};
use crate::metrics::JweMetrics;
use std::time::Instant;

/// Log and count the outcome of one encrypt or decrypt call.
pub(crate) fn observe(
    metrics: &JweMetrics,
    operation: &str,
    alg: Option<KeyEncryptionAlgorithm>,
    result: &JweResult<JweToken>,
    started: Instant,
) {
    let elapsed = started.elapsed();
    match result {
        Ok(token) => {
            let header = token.header();
            log_jwe_operation(operation, header.alg, header.enc, header.kid.as_deref(), elapsed);
            metrics.record_operation(operation, header.alg.name(), "success", elapsed);
        }
        Err(error) => {
            log_jwe_error(operation, error, elapsed);
            let alg = alg.map_or("unknown", |alg| alg.name());
            metrics.record_operation(operation, alg, error.kind().as_str(), elapsed);
        }
    }
}
