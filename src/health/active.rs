//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend with a TCP connect
//! - Write each result into the pool via `mark_status`
//! - Stop promptly when the shutdown signal fires

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::probe::probe_one;
use crate::load_balancer::{BackendPool, HealthState};
use crate::observability::metrics;

/// Outcome of one pass over the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub alive: usize,
    pub down: usize,
}

pub struct HealthMonitor {
    pool: Arc<BackendPool>,
    config: HealthCheckConfig,
}

impl HealthMonitor {
    pub fn new(pool: Arc<BackendPool>, config: HealthCheckConfig) -> Self {
        Self { pool, config }
    }

    /// Run the monitor on its own task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Check every backend on a fixed interval until shutdown.
    ///
    /// The first cycle runs immediately so freshly added backends (which
    /// start down) are admitted without waiting a whole interval.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::warn!("Active health checks disabled, assuming all backends are up");
            for backend in self.pool.backends() {
                self.pool.mark_status(backend.address(), true);
                metrics::record_backend_health(backend.address(), true);
            }
            return;
        }

        tracing::info!(
            interval_secs = self.config.interval_secs,
            timeout_secs = self.config.timeout_secs,
            backends = self.pool.len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // A cycle can take up to len * timeout; don't make
                    // shutdown wait for it.
                    tokio::select! {
                        _ = self.check_all() => {}
                        _ = shutdown.recv() => break,
                    }
                }
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("Health monitor received shutdown signal, exiting loop");
    }

    /// Probe every backend once, in order, and record the results.
    pub async fn check_all(&self) -> CycleReport {
        tracing::info!("Starting health check for all backends");
        let timeout = self.config.timeout();
        let mut report = CycleReport::default();

        for backend in self.pool.backends() {
            let address = backend.address();
            let previous = backend.state();

            let alive = probe_one(address, timeout).await;
            self.pool.mark_status(address, alive);

            let state = HealthState::from(alive);
            tracing::info!(address = %address, status = %state, "Backend status");

            if previous != state {
                match state {
                    HealthState::Alive => {
                        tracing::info!(address = %address, "Backend recovered, back in rotation")
                    }
                    HealthState::Down => {
                        tracing::warn!(address = %address, "Backend went down, removed from rotation")
                    }
                }
            }

            metrics::record_backend_health(address, alive);
            if alive {
                report.alive += 1;
            } else {
                report.down += 1;
            }
        }

        tracing::info!(alive = report.alive, down = report.down, "Health check completed");
        report
    }
}
