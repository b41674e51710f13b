//! Prometheus metrics for JWE operations.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};
use std::time::Duration;

/// JWE operations counter.
static JWE_OPERATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "token_jwe_operations_total",
        "Total number of JWE operations",
        &["operation", "alg", "status"]
    )
    .expect("Failed to register jwe_operations metric")
});

/// JWE operation latency histogram.
static JWE_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "token_jwe_latency_seconds",
        "JWE operation latency in seconds",
        &["operation"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25]
    )
    .expect("Failed to register jwe_latency metric")
});

/// Metrics recorder for the encrypter and decrypter.
#[derive(Debug, Clone, Copy)]
pub struct JweMetrics;

impl JweMetrics {
    /// Create a new metrics recorder.
    #[must_use]
    pub fn new() -> Self {
        Lazy::force(&JWE_OPERATIONS);
        Lazy::force(&JWE_LATENCY);
        Self
    }

    /// Record one operation outcome. `status` is the error kind label on failure.
    pub fn record_operation(&self, operation: &str, alg: &str, status: &str, latency: Duration) {
        JWE_OPERATIONS
            .with_label_values(&[operation, alg, status])
            .inc();
        JWE_LATENCY
            .with_label_values(&[operation])
            .observe(latency.as_secs_f64());
    }

    /// Current count for a label set.
    #[must_use]
    pub fn operation_count(&self, operation: &str, alg: &str, status: &str) -> f64 {
        JWE_OPERATIONS
            .with_label_values(&[operation, alg, status])
            .get()
    }
}

impl Default for JweMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_operation() {
        let metrics = JweMetrics::new();
        let before = metrics.operation_count("encrypt", "A128KW", "success");
        metrics.record_operation("encrypt", "A128KW", "success", Duration::from_micros(250));
        assert!(metrics.operation_count("encrypt", "A128KW", "success") > before);
    }

    #[test]
    fn test_failures_are_labelled_by_kind() {
        let metrics = JweMetrics::default();
        metrics.record_operation("decrypt", "RSA1_5", "decryption_error", Duration::from_millis(2));
        assert!(metrics.operation_count("decrypt", "RSA1_5", "decryption_error") >= 1.0);
    }
}
