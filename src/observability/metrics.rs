//! Metrics collection.
//!
//! # Metrics
//! - `healthcheck_operations_total` (counter): checker calls by operation, outcome
//! - `healthcheck_syncs_total` (counter): successful syncs by result (created, updated)
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; the embedding program installs a
//!   recorder (none installed means no-op)

use crate::healthchecks::{HealthCheckError, HealthCheckResult};

/// Outcome label for a checker result.
pub fn outcome_label<T>(result: &HealthCheckResult<T>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(HealthCheckError::NotFound { .. }) => "not_found",
        Err(HealthCheckError::Conversion { .. }) => "conversion_error",
        Err(HealthCheckError::Provider { .. }) => "provider_error",
    }
}

/// Record one checker operation.
pub fn record_operation(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "healthcheck_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record one checker operation from its result.
pub fn record_result<T>(operation: &'static str, result: &HealthCheckResult<T>) {
    record_operation(operation, outcome_label(result));
}

/// Record whether a successful sync created or replaced the health check.
pub fn record_sync(created: bool) {
    let result = if created { "created" } else { "updated" };
    metrics::counter!("healthcheck_syncs_total", "result" => result).increment(1);
}
