//! Passive health checking (failure detection).
//!
//! # Responsibilities
//! - Observe forwarding outcomes reported by the HTTP layer
//! - Mark a backend down as soon as a request to it fails at the transport level
//!
//! # Design Decisions
//! - Only connection-level failures count; any HTTP response (5xx included)
//!   proves the backend is reachable
//! - Recovery is left to the next active health check cycle

use std::fmt::Display;

use crate::load_balancer::{Backend, BackendPool};
use crate::observability::metrics;

/// Record that forwarding to `backend` failed and take it out of rotation.
pub fn report_forward_failure(pool: &BackendPool, backend: &Backend, error: &dyn Display) {
    let was_alive = backend.is_alive();
    pool.mark_status(backend.address(), false);
    metrics::record_backend_health(backend.address(), false);

    if was_alive {
        tracing::warn!(
            address = %backend.address(),
            error = %error,
            "Backend marked down after forwarding failure"
        );
    }
}
