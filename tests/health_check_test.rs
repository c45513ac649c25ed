//! Health monitor behaviour against real sockets.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

use rr_balancer::config::HealthCheckConfig;
use rr_balancer::health::{probe_one, HealthMonitor};
use rr_balancer::BackendPool;

mod common;

fn fast_checks() -> HealthCheckConfig {
    HealthCheckConfig {
        enabled: true,
        interval_secs: 1,
        timeout_secs: 1,
        passive: true,
    }
}

#[tokio::test]
async fn test_probe_closed_port_within_timeout() {
    let dead = common::closed_address().await;
    let timeout = Duration::from_millis(500);

    let start = Instant::now();
    assert!(!probe_one(&dead.to_string(), timeout).await);
    assert!(start.elapsed() < timeout + Duration::from_millis(500));
}

#[tokio::test]
async fn test_probe_unroutable_is_bounded() {
    // TEST-NET-1: never routable, so the attempt either fails fast or times out.
    let timeout = Duration::from_millis(300);
    let start = Instant::now();
    assert!(!probe_one("192.0.2.1:81", timeout).await);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_backend_recovers_on_next_cycle() {
    let (a, _a) = common::start_mock_backend("a").await;
    let down = common::closed_address().await;

    let pool = Arc::new(BackendPool::from_addresses([a.to_string(), down.to_string()]).unwrap());
    let (tx, rx) = broadcast::channel(1);
    let handle = HealthMonitor::new(pool.clone(), fast_checks()).spawn(rx);

    assert!(common::wait_until(|| pool.get(&a.to_string()).unwrap().is_alive(), Duration::from_secs(3)).await);
    assert!(!pool.get(&down.to_string()).unwrap().is_alive());

    // Bring the down backend up on the same port.
    let listener = tokio::net::TcpListener::bind(down).await.unwrap();
    assert!(
        common::wait_until(|| pool.get(&down.to_string()).unwrap().is_alive(), Duration::from_secs(4)).await,
        "backend should be marked alive by a later cycle"
    );

    // And back down again once it goes away.
    drop(listener);
    assert!(
        common::wait_until(|| !pool.get(&down.to_string()).unwrap().is_alive(), Duration::from_secs(4)).await
    );

    tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_monitor_stops_mid_cycle() {
    // Probes to an unroutable address hold the cycle for the full timeout.
    let pool = Arc::new(BackendPool::from_addresses(["192.0.2.1:81", "192.0.2.2:81"]).unwrap());
    let mut config = fast_checks();
    config.timeout_secs = 30;

    let (tx, rx) = broadcast::channel(1);
    let handle = HealthMonitor::new(pool, config).spawn(rx);

    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}
