//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HealthChecker operations produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (operation and sync counters)
//! ```
//!
//! # Design Decisions
//! - Structured fields (name, port, protocol, api) on every event
//! - Metrics are cheap counter increments

pub mod logging;
pub mod metrics;
