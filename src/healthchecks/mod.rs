//! Health-check reconciler.
//!
//! # Data Flow
//! ```text
//! caller computes desired protocol/port
//!     → checker.rs new_check() or get() + mutate
//!     → value.rs (HealthCheck, wire conversion)
//!     → surface.rs (stable or alpha API, by port binding)
//!     → checker.rs sync() → create or replace remotely
//!
//! Teardown / migration:
//!     checker.rs delete() / delete_legacy()
//! ```
//!
//! # Design Decisions
//! - Remote state is authoritative; a `HealthCheck` is a working copy
//! - The core does no background work and needs no shutdown hook

pub mod checker;
pub mod errors;
mod surface;
pub mod value;

pub use checker::HealthChecker;
pub use errors::{ConversionError, HealthCheckError, HealthCheckResult, Operation};
pub use value::{HealthCheck, PortBinding, Protocol};
