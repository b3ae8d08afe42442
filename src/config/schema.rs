//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the reconciler.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the health-check reconciler.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Cluster identity used to name resources.
    pub cluster: ClusterConfig,

    /// Defaults applied to newly built health checks.
    pub health_check: HealthCheckDefaults,

    /// Local store used by the command-line tool.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Cluster identity.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    /// Cluster name appended to resource names (empty = no suffix).
    pub name: String,
}

/// Health check defaults.
///
/// The low healthy threshold and high unhealthy threshold only aim to detect
/// broken node networking; service-level outages are caught sooner elsewhere.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct HealthCheckDefaults {
    /// Path probed by HTTP, HTTPS and HTTP/2 checks.
    pub request_path: String,

    /// Seconds between probes.
    pub check_interval_sec: i64,

    /// Seconds to wait for a probe response. Must not exceed the interval.
    pub timeout_sec: i64,

    /// Consecutive successes before a backend is declared healthy.
    pub healthy_threshold: i64,

    /// Consecutive failures before a backend is declared unhealthy.
    pub unhealthy_threshold: i64,

    /// Description written on created resources.
    pub description: String,
}

impl Default for HealthCheckDefaults {
    fn default() -> Self {
        Self {
            request_path: "/".to_string(),
            check_interval_sec: 60,
            timeout_sec: 60,
            healthy_threshold: 1,
            unhealthy_threshold: 10,
            description: "Default kubernetes L7 Loadbalancing health check.".to_string(),
        }
    }
}

impl HealthCheckDefaults {
    /// Defaults with a different probe path.
    pub fn with_request_path(path: impl Into<String>) -> Self {
        Self {
            request_path: path.into(),
            ..Self::default()
        }
    }
}

/// Local store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON store file.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "healthchecks.json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
