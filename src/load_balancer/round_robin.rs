//! Round-robin rotation over a fixed slice of backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::backend::Backend;

/// Round-robin selector.
///
/// Holds the shared rotation cursor. The cursor is only a hint for where the
/// next scan starts; its absolute value means nothing and wraps freely.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the cursor by one and map it onto `0..len`.
    ///
    /// Concurrent callers each observe a distinct increment, so N callers get
    /// N successive indices (modulo `len`).
    ///
    /// # Panics
    /// Panics if `len` is zero. `BackendPool` never holds an empty list.
    pub fn next_index(&self, len: usize) -> usize {
        let next = self.cursor.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        next % len
    }

    /// Pick the next alive backend, scanning forward from `next_index`.
    ///
    /// Returns `None` if every backend is down.
    pub fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let len = backends.len();
        let start = self.next_index(len);

        for offset in 0..len {
            let index = (start + offset) % len;
            let backend = &backends[index];
            if backend.is_alive() {
                // Unlike an unconditional store, publish only after a skip:
                // when the start was alive the increment already left the
                // cursor here, and storing would let concurrent callers rewind it.
                if offset > 0 {
                    self.cursor.store(index, Ordering::Relaxed);
                }
                return Some(backend.clone());
            }
        }
        None
    }

    #[cfg(test)]
    fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}
