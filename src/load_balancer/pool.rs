//! Backend pool management.
//!
//! # Responsibilities
//! - Hold the fixed, ordered list of backends for the process lifetime
//! - Select the next alive backend in round-robin order
//! - Apply liveness updates by address

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::load_balancer::{
    backend::{normalize_address, Backend},
    round_robin::RoundRobin,
    PoolError,
};

/// Collects backends during startup.
///
/// Backends can only be added here; once `build` hands out a `BackendPool`
/// the list is frozen, so request handlers and the health monitor never race
/// a structural change.
#[derive(Debug, Default)]
pub struct PoolBuilder {
    backends: Vec<Backend>,
}

impl PoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend to the end of the rotation order.
    pub fn add_backend(mut self, backend: Backend) -> Self {
        self.backends.push(backend);
        self
    }

    /// Freeze the list. Rejects an empty list and duplicate addresses.
    pub fn build(self) -> Result<BackendPool, PoolError> {
        if self.backends.is_empty() {
            return Err(PoolError::Empty);
        }

        let mut seen = HashSet::new();
        for backend in &self.backends {
            if !seen.insert(backend.address()) {
                return Err(PoolError::Duplicate(backend.address().to_string()));
            }
        }

        Ok(BackendPool {
            backends: self.backends.into_iter().map(Arc::new).collect(),
            rotation: RoundRobin::new(),
        })
    }
}

/// A fixed set of backends plus the shared rotation cursor.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
    rotation: RoundRobin,
}

impl BackendPool {
    /// Start building a pool.
    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    /// Build a pool from a list of addresses, in order.
    pub fn from_addresses<I, S>(addresses: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        addresses
            .into_iter()
            .try_fold(
                PoolBuilder::new(),
                |builder, address| -> Result<PoolBuilder, PoolError> {
                    Ok(builder.add_backend(Backend::new(address.as_ref())?))
                },
            )?
            .build()
    }

    /// Build a pool from configuration.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, PoolError> {
        Self::from_addresses(configs.iter().map(|c| c.address.as_str()))
    }

    /// Set the liveness of the backend with the given address.
    ///
    /// Unknown addresses are ignored. Returns whether a backend matched.
    pub fn mark_status(&self, address: &str, alive: bool) -> bool {
        match self.get(address) {
            Some(backend) => {
                backend.set_alive(alive);
                true
            }
            None => {
                tracing::debug!(address = %address, "mark_status for unknown backend ignored");
                false
            }
        }
    }

    /// Advance the rotation cursor and return the next starting index.
    pub fn next_index(&self) -> usize {
        self.rotation.next_index(self.backends.len())
    }

    /// Select the next alive backend, or `None` if every backend is down.
    pub fn get_next_peer(&self) -> Option<Arc<Backend>> {
        let peer = self.rotation.next_server(&self.backends);
        if peer.is_none() {
            tracing::debug!(backend_count = self.backends.len(), "No alive backends in pool");
        }
        peer
    }

    /// Look up a backend by address (`host:port` or `http://` URL).
    pub fn get(&self, address: &str) -> Option<&Arc<Backend>> {
        let address = normalize_address(address).ok()?;
        self.backends.iter().find(|b| b.address() == address)
    }

    /// All backends in rotation order.
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Number of backends; always at least one.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Always false: an empty pool cannot be built.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Number of backends currently believed alive.
    pub fn alive_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_alive()).count()
    }
}
