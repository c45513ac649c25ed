//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server by its normalised `host:port` address
//! - Track liveness (Alive/Down) behind a lock owned by this record only
//!
//! # Design Decisions
//! - New backends start Down and are admitted by the first successful probe
//! - The address never changes after construction, so reading it takes no lock

use std::fmt;
use std::sync::{PoisonError, RwLock};
use url::Url;

use crate::load_balancer::PoolError;

/// Externally visible health state of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Alive,
    Down,
}

impl From<bool> for HealthState {
    fn from(alive: bool) -> Self {
        if alive {
            HealthState::Alive
        } else {
            HealthState::Down
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Alive => write!(f, "up"),
            HealthState::Down => write!(f, "down"),
        }
    }
}

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Normalised `host:port` identity of the backend.
    address: String,
    /// Liveness flag. Only touched through `set_alive` / `is_alive`.
    alive: RwLock<bool>,
}

impl Backend {
    /// Create a new backend from `host:port` or an `http://` URL.
    ///
    /// The backend starts Down until a health check proves otherwise.
    pub fn new(address: &str) -> Result<Self, PoolError> {
        Ok(Self {
            address: normalize_address(address)?,
            alive: RwLock::new(false),
        })
    }

    /// The backend's `host:port` address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Record the latest liveness belief for this backend.
    pub fn set_alive(&self, flag: bool) {
        // A poisoned lock still guards a whole bool; keep using it.
        let mut alive = self.alive.write().unwrap_or_else(PoisonError::into_inner);
        *alive = flag;
    }

    /// Return true if the backend is currently believed reachable.
    pub fn is_alive(&self) -> bool {
        *self.alive.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current health state.
    pub fn state(&self) -> HealthState {
        HealthState::from(self.is_alive())
    }
}

/// Normalise a configured backend address to its `host:port` authority.
///
/// Accepts `host:port`, `host` (port 80) or an `http://` URL. Any path on a
/// URL is ignored.
pub fn normalize_address(input: &str) -> Result<String, PoolError> {
    let trimmed = input.trim();
    let invalid = |reason: &str| PoolError::InvalidAddress {
        address: input.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid("address is empty"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme() != "http" {
        return Err(invalid("only http backends are supported"));
    }

    let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| invalid("missing port"))?;

    Ok(format!("{}:{}", host, port))
}
