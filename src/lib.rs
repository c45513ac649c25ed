//! Round-robin HTTP load balancer.
//!
//! Requests are spread across a fixed list of backends in rotation, skipping
//! any backend the health monitor currently believes is down.

pub mod cli;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::BalancerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Backend, BackendPool};
