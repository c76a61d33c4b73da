//! API Gateway
//!
//! Single entry point for the backend microservices. Each request passes
//! through an ordered pipeline before it is forwarded:
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                  API GATEWAY                      │
//!  Client ───────▶│  routing ─▶ rate limit ─▶ auth ─▶ role ─▶ forward │───▶ Backend
//!                 │     │           │           │        │            │
//!                 │    404         429         401      403           │
//!                 │                                                   │
//!                 │  cross-cutting: config · observability · lifecycle│
//!                 └──────────────────────────────────────────────────┘
//! ```
//!
//! Any gate failure short-circuits the pipeline; the backend is never
//! called for a rejected request. `GET /health` bypasses the pipeline.

use std::sync::Arc;

use tokio::net::TcpListener;

use api_gateway::config;
use api_gateway::lifecycle::{signals, Shutdown};
use api_gateway::observability;
use api_gateway::routing::RouteTable;
use api_gateway::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_from_env()?;

    observability::logging::init(&config.observability.log_level);

    tracing::info!(
        listen_addr = %config.listen_addr,
        rate_limit_requests = config.rate_limit.requests,
        rate_limit_window_secs = config.rate_limit.window_secs,
        forward_timeout_secs = config.timeouts.forward_secs,
        "configuration loaded"
    );

    let table = Arc::new(RouteTable::standard(&config.services));
    if let Err(errors) = config::validate_table(&table) {
        for error in &errors {
            tracing::error!(error = %error, "invalid route table");
        }
        return Err("route table validation failed".into());
    }
    tracing::info!(routes = table.routes().len(), "route table built");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listen_addr).await?;

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        signal_shutdown.trigger();
    });

    let server = HttpServer::new(&config, table);
    server.run(listener, &shutdown).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
