//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing + timeout middleware)
//!     → BackendPool::get_next_peer
//!         - None → 503 Service Unavailable
//!         - Some(backend) → rewrite URI, strip hop-by-hop headers, forward
//!     → stream backend response to client
//!     → on transport failure: 502 + passive mark down
//! ```

pub mod server;

pub use server::HttpServer;
