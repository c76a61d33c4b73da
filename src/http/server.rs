//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: `/health` bypass plus the wildcard pipeline
//!   handler
//! - Wire up middleware (request ID, tracing, CORS, timeout, body limit)
//! - Serve with graceful shutdown
//! - Record per-request metrics

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, DefaultBodyLimit, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::forward::Forwarder;
use crate::http::request::MakeRequestUuid;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::pipeline::Pipeline;
use crate::routing::RouteTable;
use crate::security::headers::cors_layer;
use crate::security::rate_limit::RateLimiter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Assemble the pipeline and middleware stack from the configuration
    /// and an injected route table.
    pub fn new(config: &GatewayConfig, table: Arc<RouteTable>) -> Self {
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit.requests,
            Duration::from_secs(config.rate_limit.window_secs),
        ));
        let forwarder = Forwarder::new(Duration::from_secs(config.timeouts.forward_secs));
        let pipeline = Arc::new(Pipeline::new(
            table,
            Arc::clone(&limiter),
            config.jwt_access_secret.clone().into_bytes(),
            forwarder,
        ));

        let router = Self::build_router(config, AppState { pipeline });
        Self { router, limiter }
    }

    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(DefaultBodyLimit::max(config.max_body_bytes))
            .layer(cors_layer(&config.cors))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "gateway listening");

        self.limiter.spawn_sweeper(shutdown.subscribe());

        let mut rx = shutdown.subscribe();
        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.recv().await;
            })
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }
}

/// Liveness probe; bypasses the pipeline entirely.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "api-gateway" }))
}

/// Every non-health request funnels through here into the pipeline.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let response = match state.pipeline.handle(peer, request).await {
        Ok(response) => response.into_response(),
        Err(err) => err.into_response(),
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
