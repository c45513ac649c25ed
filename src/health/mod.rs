//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer (first tick immediate)
//!     → probe.rs (TCP connect with timeout)
//!     → BackendPool::mark_status
//!
//! Passive health checks (passive.rs):
//!     Forwarding failure observed by the HTTP layer
//!     → BackendPool::mark_status(address, false)
//! ```
//!
//! # Design Decisions
//! - Two states only: Alive and Down, decided by the latest result
//! - No retries inside a cycle; the next cycle is the retry
//! - Probe failures are state, never errors

pub mod active;
pub mod passive;
pub mod probe;

pub use active::{CycleReport, HealthMonitor};
pub use probe::probe_one;
