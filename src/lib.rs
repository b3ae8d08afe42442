//! Load balancer health-check reconciler for Ingress backends.

pub mod cloud;
pub mod config;
pub mod healthchecks;
pub mod namer;
pub mod observability;

pub use config::ReconcilerConfig;
pub use healthchecks::{HealthCheck, HealthCheckError, HealthChecker, PortBinding, Protocol};
pub use namer::{ClusterNamer, Namer};
