//! Request pipeline orchestration.
//!
//! # Data Flow
//! ```text
//! Received → resolve route → [gates: rate_limit → auth? → role?] → forward
//!                 │                      │
//!                 └── NotFound           └── first failure short-circuits;
//!                                            the backend is never called
//! ```
//!
//! # Design Decisions
//! - Gate chains are compiled per route at startup, not decided per request
//! - Every rejection is logged with the internal reason and counted; the
//!   client sees only the generic taxonomy message
//! - The backend's response (including its own 4xx/5xx) is returned
//!   unchanged

pub mod gate;

pub use gate::{AuthGate, Gate, RateLimitGate, RequestContext, RoleGate};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Request, Response},
};

use crate::error::GatewayError;
use crate::http::forward::Forwarder;
use crate::http::request::request_id;
use crate::observability::metrics;
use crate::routing::RouteTable;
use crate::security::rate_limit::RateLimiter;

/// Composes the gates and the forwarder into the per-request state machine.
pub struct Pipeline {
    table: Arc<RouteTable>,
    /// Gate chain per route, parallel to `table.routes()`.
    chains: Vec<Vec<Arc<dyn Gate>>>,
    forwarder: Forwarder,
}

impl Pipeline {
    pub fn new(
        table: Arc<RouteTable>,
        limiter: Arc<RateLimiter>,
        jwt_secret: Vec<u8>,
        forwarder: Forwarder,
    ) -> Self {
        let secret = Arc::new(jwt_secret);
        let rate_gate: Arc<dyn Gate> = Arc::new(RateLimitGate::new(limiter, Arc::clone(&secret)));
        let auth_gate: Arc<dyn Gate> = Arc::new(AuthGate::new(secret));
        let role_gate: Arc<dyn Gate> = Arc::new(RoleGate);

        let chains = table
            .routes()
            .iter()
            .map(|route| {
                let mut chain = vec![Arc::clone(&rate_gate)];
                if route.requires_auth {
                    chain.push(Arc::clone(&auth_gate));
                }
                if !route.allowed_roles.is_empty() {
                    chain.push(Arc::clone(&role_gate));
                }
                chain
            })
            .collect();

        Self {
            table,
            chains,
            forwarder,
        }
    }

    /// Run one request through the gates and, if admitted, the forwarder.
    pub async fn handle(
        &self,
        peer: SocketAddr,
        request: Request<Body>,
    ) -> Result<Response<Body>, GatewayError> {
        let rid = request_id(request.headers()).to_string();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let client_addr = client_addr(request.headers(), peer);

        let result = self.run(&client_addr, request).await;

        if let Err(err) = &result {
            tracing::warn!(
                request_id = %rid,
                method = %method,
                path = %path,
                client = %client_addr,
                reason = err.reason(),
                "request rejected"
            );
            metrics::record_rejection(err.reason());
        }

        result
    }

    async fn run(
        &self,
        client_addr: &str,
        request: Request<Body>,
    ) -> Result<Response<Body>, GatewayError> {
        let (idx, route) = self
            .table
            .resolve_entry(request.method(), request.uri().path())
            .ok_or(GatewayError::NotFound)?;

        let mut ctx = RequestContext::new(client_addr.to_string());
        for gate in &self.chains[idx] {
            gate.check(route, request.headers(), &mut ctx)?;
        }

        self.forwarder
            .forward(request, &route.backend_base_url, ctx.claims.as_ref())
            .await
    }
}

/// Client network address for rate-limit bucketing: the first
/// `X-Forwarded-For` hop when an upstream proxy set it, otherwise the peer
/// address.
fn client_addr(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|raw| raw.split(',').next().unwrap_or(raw).trim().to_string())
        .unwrap_or_else(|| peer.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn peer_address_is_the_default() {
        let peer: SocketAddr = "192.0.2.9:4711".parse().unwrap();
        assert_eq!(client_addr(&HeaderMap::new(), peer), "192.0.2.9");
    }

    #[test]
    fn forwarded_for_takes_the_first_hop() {
        let peer: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 10.0.0.2"),
        );
        assert_eq!(client_addr(&headers, peer), "203.0.113.5");
    }
}
