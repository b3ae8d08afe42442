//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds and intervals positive)
//! - Enforce probe timeout <= probe interval
//! - Check the cluster name fits remote resource naming
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ReconcilerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::ReconcilerConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ReconcilerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let hc = &config.health_check;

    if !hc.request_path.starts_with('/') {
        errors.push(ValidationError::new(
            "health_check.request_path",
            format!("must start with '/', got {:?}", hc.request_path),
        ));
    }
    if hc.check_interval_sec < 1 {
        errors.push(ValidationError::new(
            "health_check.check_interval_sec",
            "must be at least 1",
        ));
    }
    if hc.timeout_sec < 1 {
        errors.push(ValidationError::new("health_check.timeout_sec", "must be at least 1"));
    } else if hc.timeout_sec > hc.check_interval_sec {
        errors.push(ValidationError::new(
            "health_check.timeout_sec",
            format!(
                "{} exceeds check_interval_sec {}",
                hc.timeout_sec, hc.check_interval_sec
            ),
        ));
    }
    if hc.healthy_threshold < 1 {
        errors.push(ValidationError::new(
            "health_check.healthy_threshold",
            "must be at least 1",
        ));
    }
    if hc.unhealthy_threshold < 1 {
        errors.push(ValidationError::new(
            "health_check.unhealthy_threshold",
            "must be at least 1",
        ));
    }

    let cluster = &config.cluster.name;
    if !cluster
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        errors.push(ValidationError::new(
            "cluster.name",
            format!("{:?} may only contain lowercase letters, digits and '-'", cluster),
        ));
    }

    if config.store.path.is_empty() {
        errors.push(ValidationError::new("store.path", "must not be empty"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level {:?}", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
