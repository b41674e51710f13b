//! Structured logging helpers for JWE operations.
//!
//! Only algorithm names, key ids, timings and error kinds are logged. Key
//! bytes, CEKs, plaintext and claims never reach a log line.

use crate::error::JweError;
use crate::jwe::algorithm::{BlockEncryptionAlgorithm, KeyEncryptionAlgorithm};
use std::error::Error as _;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Log a completed JWE operation.
pub fn log_jwe_operation(
    operation: &str,
    alg: KeyEncryptionAlgorithm,
    enc: BlockEncryptionAlgorithm,
    kid: Option<&str>,
    duration: Duration,
) {
    info!(
        target: "jwe",
        operation = %operation,
        alg = %alg,
        enc = %enc,
        kid = kid.unwrap_or("-"),
        duration_ms = duration.as_millis() as u64,
        status = "success",
        "JWE operation completed"
    );
}

/// Log a failed JWE operation.
///
/// The public message goes out at `warn`; the provider cause, if any, only
/// at `debug`.
pub fn log_jwe_error(operation: &str, error: &JweError, duration: Duration) {
    warn!(
        target: "jwe",
        operation = %operation,
        error_kind = error.kind().as_str(),
        error_code = error.kind().code(),
        error_message = %error.public_message(),
        duration_ms = duration.as_millis() as u64,
        status = "error",
        "JWE operation failed"
    );

    if let Some(cause) = error.source() {
        debug!(
            target: "jwe",
            operation = %operation,
            cause = %cause,
            "JWE provider failure"
        );
    }
}

/// Log the RSA1_5 substitution of a random CEK after an unwrap failure.
pub fn log_cek_substituted(alg: KeyEncryptionAlgorithm) {
    debug!(
        target: "jwe",
        operation = "decrypt",
        alg = %alg,
        "Key unwrap failed, continuing with random CEK"
    );
}
