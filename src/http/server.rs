//! HTTP server setup and request forwarding.
//!
//! # Responsibilities
//! - Create the Axum router with a catch-all proxy handler
//! - Wire up middleware (tracing, request timeout)
//! - Pick a backend per request from the pool
//! - Forward the request and stream the response back
//! - Feed transport failures back into the pool (passive health)
//! - Run the active health monitor alongside the server

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderMap, HeaderName},
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::BalancerConfig;
use crate::health::{passive, HealthMonitor};
use crate::load_balancer::{BackendPool, PoolError};
use crate::observability::metrics;

/// Headers that apply to a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<BackendPool>,
    pub client: Client<HttpConnector, Body>,
    pub passive_health: bool,
}

/// HTTP front end of the balancer.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
    pool: Arc<BackendPool>,
}

impl HttpServer {
    /// Build the pool from `config.backends` and the router around it.
    pub fn new(config: BalancerConfig) -> Result<Self, PoolError> {
        let pool = Arc::new(BackendPool::from_config(&config.backends)?);
        Ok(Self::with_pool(config, pool))
    }

    /// Use an already built pool.
    pub fn with_pool(config: BalancerConfig, pool: Arc<BackendPool>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.health_check.timeout()));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        // Passive marking only ever takes backends out; without active
        // checks nothing would bring them back.
        let passive_health = config.health_check.passive && config.health_check.enabled;
        if config.health_check.passive && !config.health_check.enabled {
            tracing::warn!("Passive health marking ignored while active health checks are disabled");
        }

        let state = AppState {
            pool: pool.clone(),
            client,
            passive_health,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            pool,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BalancerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// The health monitor runs on its own task for the same lifetime.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.pool.len(),
            "HTTP server starting"
        );

        let monitor = HealthMonitor::new(self.pool.clone(), self.config.health_check.clone())
            .spawn(shutdown.resubscribe());

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        if let Err(e) = monitor.await {
            tracing::error!(error = %e, "Health monitor task failed");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The backend pool behind this server.
    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }
}

/// Main proxy handler.
/// Selects the next alive backend and forwards the request to it.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();

    let backend = match state.pool.get_next_peer() {
        Some(b) => b,
        None => {
            tracing::warn!(method = %method, path = %request.uri().path(), "No healthy backends");
            metrics::record_no_backend();
            metrics::record_request(&method, 503, "none", start_time);
            return (StatusCode::SERVICE_UNAVAILABLE, "No healthy backends").into_response();
        }
    };

    let (mut parts, body) = request.into_parts();
    parts.uri = match backend_uri(&parts.uri, backend.address()) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(address = %backend.address(), error = %e, "Failed to build backend URI");
            metrics::record_request(&method, 502, backend.address(), start_time);
            return (StatusCode::BAD_GATEWAY, "Invalid backend address").into_response();
        }
    };
    parts.version = Version::HTTP_11;
    strip_hop_by_hop(&mut parts.headers);

    tracing::debug!(method = %method, uri = %parts.uri, "Forwarding request");

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), backend.address(), start_time);
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(address = %backend.address(), error = %e, "Upstream error");
            // Body and client-side errors say nothing about the backend.
            if state.passive_health && e.is_connect() {
                passive::report_forward_failure(&state.pool, &backend, &e);
            }
            metrics::record_request(&method, 502, backend.address(), start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Rewrite an origin-form request URI to point at `address`.
fn backend_uri(original: &Uri, address: &str) -> Result<Uri, axum::http::Error> {
    let mut uri_parts = original.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(Authority::from_str(address)?);
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    Ok(Uri::from_parts(uri_parts)?)
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}
