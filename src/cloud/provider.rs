//! Boundary to the remote compute API.
//!
//! # Responsibilities
//! - Expose get/create/update/delete for the unified health-check resource on
//!   both the stable and the advanced surface
//! - Expose create/delete for the two legacy protocol-specific kinds
//! - Report absence distinguishably from every other failure
//!
//! # Design Decisions
//! - Calls are synchronous; timeouts belong to the transport behind the trait
//! - Implementations must be `Send + Sync` so one checker can serve many ports

use std::fmt;

use thiserror::Error;

use crate::cloud::wire::{AlphaHealthCheck, HealthCheck, LegacyHealthCheck};

/// Remote resource collection an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    HealthCheck,
    LegacyHttpHealthCheck,
    LegacyHttpsHealthCheck,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::HealthCheck => "healthChecks",
            ResourceKind::LegacyHttpHealthCheck => "httpHealthChecks",
            ResourceKind::LegacyHttpsHealthCheck => "httpsHealthChecks",
        };
        f.write_str(s)
    }
}

/// Errors returned by a [`HealthCheckProvider`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The named resource does not exist.
    #[error("{kind}/{name} not found")]
    NotFound { kind: ResourceKind, name: String },

    /// A resource with that name already exists.
    #[error("{kind}/{name} already exists")]
    AlreadyExists { kind: ResourceKind, name: String },

    /// The update carried a missing or stale fingerprint.
    #[error("{kind}/{name} was modified concurrently (fingerprint mismatch)")]
    FingerprintMismatch { kind: ResourceKind, name: String },

    /// The remote side rejected the request body.
    #[error("invalid request for {kind}/{name}: {reason}")]
    Invalid {
        kind: ResourceKind,
        name: String,
        reason: String,
    },

    /// The call did not complete (network, persistence, quota...).
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// True when the resource is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status the compute API answers with for this condition.
    pub fn code(&self) -> u16 {
        match self {
            ApiError::NotFound { .. } => 404,
            ApiError::AlreadyExists { .. } => 409,
            ApiError::FingerprintMismatch { .. } => 412,
            ApiError::Invalid { .. } => 400,
            ApiError::Transport(_) => 503,
        }
    }
}

/// Result type for provider calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Remote API for health-check resources.
pub trait HealthCheckProvider: Send + Sync {
    fn get_health_check(&self, name: &str) -> ApiResult<HealthCheck>;
    fn get_alpha_health_check(&self, name: &str) -> ApiResult<AlphaHealthCheck>;

    fn create_health_check(&self, hc: &HealthCheck) -> ApiResult<()>;
    fn create_alpha_health_check(&self, hc: &AlphaHealthCheck) -> ApiResult<()>;

    /// Replace the named resource. `hc.fingerprint` must match the current one.
    fn update_health_check(&self, name: &str, hc: &HealthCheck) -> ApiResult<()>;
    fn update_alpha_health_check(&self, name: &str, hc: &AlphaHealthCheck) -> ApiResult<()>;

    fn delete_health_check(&self, name: &str) -> ApiResult<()>;

    /// All unified health checks, sorted by name.
    fn list_health_checks(&self) -> ApiResult<Vec<AlphaHealthCheck>>;

    fn create_legacy_http_health_check(&self, hc: &LegacyHealthCheck) -> ApiResult<()>;
    fn create_legacy_https_health_check(&self, hc: &LegacyHealthCheck) -> ApiResult<()>;
    fn delete_legacy_http_health_check(&self, name: &str) -> ApiResult<()>;
    fn delete_legacy_https_health_check(&self, name: &str) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = ApiError::NotFound {
            kind: ResourceKind::HealthCheck,
            name: "k8s-be-80".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.code(), 404);
        assert_eq!(err.to_string(), "healthChecks/k8s-be-80 not found");

        let err = ApiError::FingerprintMismatch {
            kind: ResourceKind::HealthCheck,
            name: "k8s-be-80".into(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.code(), 412);
    }

    #[test]
    fn test_legacy_kind_display() {
        assert_eq!(ResourceKind::LegacyHttpsHealthCheck.to_string(), "httpsHealthChecks");
    }
}
