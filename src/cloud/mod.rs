//! Remote compute API boundary.
//!
//! # Data Flow
//! ```text
//! HealthChecker
//!     → provider.rs (HealthCheckProvider trait, ApiError)
//!     → wire.rs (stable / advanced / legacy JSON bodies)
//!     → implementation:
//!         - memory.rs (concurrent maps, tests and embedding)
//!         - file.rs (memory store persisted as JSON)
//! ```
//!
//! # Design Decisions
//! - The reconciler only sees the trait; transports live behind it
//! - Absence is a dedicated error variant, never a string match

pub mod file;
pub mod memory;
pub mod provider;
pub mod wire;

pub use file::{FileProvider, StoreError};
pub use memory::{MemoryProvider, StoreSnapshot};
pub use provider::{ApiError, ApiResult, HealthCheckProvider, ResourceKind};
