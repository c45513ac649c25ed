//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (get_next_peer)
//!     → round_robin.rs (advance cursor, scan forward for an alive backend)
//!     → backend.rs (read liveness under the backend's own lock)
//!     → Return backend, or None when every backend is down
//! ```
//!
//! # Design Decisions
//! - Backend list is fixed once the pool is built
//! - Liveness is locked per backend, never pool-wide
//! - The rotation cursor is a single atomic, never a lock
//! - Down backends are skipped, not removed

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::{Backend, HealthState};
pub use pool::{BackendPool, PoolBuilder};

use thiserror::Error;

/// Errors raised while building a backend pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// No backends were configured.
    #[error("backend pool needs at least one backend")]
    Empty,

    /// A backend address could not be parsed.
    #[error("invalid backend address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The same backend address was configured twice.
    #[error("duplicate backend address {0}")]
    Duplicate(String),
}
