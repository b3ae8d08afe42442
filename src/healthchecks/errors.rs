//! Health-check reconciler errors.

use std::fmt;

use thiserror::Error;

use crate::cloud::ApiError;

/// A health check that cannot be expressed on the wire.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// The protocol has no probe sub-object this reconciler knows how to write.
    #[error("unsupported health check protocol {0:?}")]
    UnsupportedProtocol(String),

    /// Serving-port binding only exists on the advanced API.
    #[error("port specification requires the alpha API")]
    PortSpecificationRequiresAlpha,

    #[error("timeout of {timeout_sec}s exceeds check interval of {check_interval_sec}s")]
    TimeoutExceedsInterval {
        timeout_sec: i64,
        check_interval_sec: i64,
    },
}

/// Remote operation attempted when a provider call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Create,
    Update,
    Delete,
    DeleteLegacyHttp,
    DeleteLegacyHttps,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::DeleteLegacyHttp => "delete_legacy_http",
            Operation::DeleteLegacyHttps => "delete_legacy_https",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the [`HealthChecker`](crate::healthchecks::HealthChecker).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HealthCheckError {
    /// The health check does not exist remotely.
    #[error("health check {name:?} for port {port} not found")]
    NotFound { name: String, port: i64 },

    /// The desired value cannot be written. Never worth retrying.
    #[error("health check {name:?} for port {port} cannot be converted: {source}")]
    Conversion {
        name: String,
        port: i64,
        #[source]
        source: ConversionError,
    },

    /// The remote call failed for a reason other than absence.
    #[error("{operation} of health check {name:?} for port {port} failed: {source}")]
    Provider {
        name: String,
        port: i64,
        operation: Operation,
        #[source]
        source: ApiError,
    },
}

impl HealthCheckError {
    /// True when the health check is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HealthCheckError::NotFound { .. })
    }

    /// Name of the resource the error refers to.
    pub fn name(&self) -> &str {
        match self {
            HealthCheckError::NotFound { name, .. }
            | HealthCheckError::Conversion { name, .. }
            | HealthCheckError::Provider { name, .. } => name,
        }
    }

    /// Backend port the error refers to.
    pub fn port(&self) -> i64 {
        match self {
            HealthCheckError::NotFound { port, .. }
            | HealthCheckError::Conversion { port, .. }
            | HealthCheckError::Provider { port, .. } => *port,
        }
    }

    /// Wrap a provider failure, mapping absence to [`HealthCheckError::NotFound`].
    pub(crate) fn from_api(name: &str, port: i64, operation: Operation, err: ApiError) -> Self {
        if err.is_not_found() {
            HealthCheckError::NotFound {
                name: name.to_string(),
                port,
            }
        } else {
            HealthCheckError::Provider {
                name: name.to_string(),
                port,
                operation,
                source: err,
            }
        }
    }
}

/// Result type for health-check operations.
pub type HealthCheckResult<T> = Result<T, HealthCheckError>;
