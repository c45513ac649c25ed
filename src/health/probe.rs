//! TCP reachability probe.

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;

/// Try to open a TCP connection to `address` within `timeout`.
///
/// The connection is closed straight away; no application data is sent.
/// Refusals, resolution failures and timeouts all count as unreachable.
pub async fn probe_one(address: &str, timeout: Duration) -> bool {
    match time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            true
        }
        Ok(Err(e)) => {
            tracing::info!(address = %address, error = %e, "Connection could not be established");
            false
        }
        Err(_) => {
            tracing::info!(address = %address, timeout = ?timeout, "Connection attempt timed out");
            false
        }
    }
}
