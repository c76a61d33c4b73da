//! Pipeline gates.
//!
//! A gate may reject a request before it reaches the backend. Gates are
//! compiled per route at startup and run in a fixed order: rate limiting
//! first, then credential validation, then role authorization. On
//! authenticated routes the rate gate verifies the token once to derive
//! its bucket key; the credential gate reuses the stashed claims.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth;
use crate::error::GatewayError;
use crate::routing::RouteDescriptor;
use crate::security::rate_limit::RateLimiter;

/// Mutable per-request state threaded through the gate chain.
#[derive(Debug)]
pub struct RequestContext {
    /// Network address used for unauthenticated rate-limit bucketing.
    pub client_addr: String,

    /// Present only after the credential gate verified a token.
    pub claims: Option<auth::TokenClaims>,
}

impl RequestContext {
    pub fn new(client_addr: String) -> Self {
        Self {
            client_addr,
            claims: None,
        }
    }
}

pub trait Gate: Send + Sync {
    /// Short label for logs and metrics.
    fn name(&self) -> &'static str;

    fn check(
        &self,
        route: &RouteDescriptor,
        headers: &HeaderMap,
        ctx: &mut RequestContext,
    ) -> Result<(), GatewayError>;
}

/// Fixed-window admission per client key.
pub struct RateLimitGate {
    limiter: Arc<RateLimiter>,
    secret: Arc<Vec<u8>>,
}

impl RateLimitGate {
    pub fn new(limiter: Arc<RateLimiter>, secret: Arc<Vec<u8>>) -> Self {
        Self { limiter, secret }
    }
}

impl Gate for RateLimitGate {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn check(
        &self,
        route: &RouteDescriptor,
        headers: &HeaderMap,
        ctx: &mut RequestContext,
    ) -> Result<(), GatewayError> {
        let key = client_key(route, headers, ctx, &self.secret);
        self.limiter.check(&key)
    }
}

/// Rate-limit bucket key: verified token subject on authenticated routes,
/// peer address otherwise.
///
/// The subject must come from a verified token. Keying on unverified claims
/// would let a client mint a fresh forged subject per request and get a
/// fresh bucket every time, so any verification failure falls back to the
/// address bucket (the credential gate will reject the request anyway).
/// Verified claims are stashed on the context so [`AuthGate`] does not
/// repeat the work.
fn client_key(
    route: &RouteDescriptor,
    headers: &HeaderMap,
    ctx: &mut RequestContext,
    secret: &[u8],
) -> String {
    if route.requires_auth {
        if let Ok(token) = auth::extract_token(headers) {
            if let Ok(claims) = auth::validate(&token, secret) {
                let key = format!("sub:{}", claims.subject);
                ctx.claims = Some(claims);
                return key;
            }
        }
    }
    format!("ip:{}", ctx.client_addr)
}

/// Verifies the bearer token and attaches claims to the context.
pub struct AuthGate {
    secret: Arc<Vec<u8>>,
}

impl AuthGate {
    pub fn new(secret: Arc<Vec<u8>>) -> Self {
        Self { secret }
    }
}

impl Gate for AuthGate {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn check(
        &self,
        _route: &RouteDescriptor,
        headers: &HeaderMap,
        ctx: &mut RequestContext,
    ) -> Result<(), GatewayError> {
        // The rate-limit gate may already have verified the token while
        // deriving its bucket key.
        if ctx.claims.is_some() {
            return Ok(());
        }
        let token = auth::extract_token(headers)?;
        let claims = auth::validate(&token, &self.secret)?;
        ctx.claims = Some(claims);
        Ok(())
    }
}

/// Matches the verified role against the route's allow-list. Always runs
/// after [`AuthGate`] in a chain.
pub struct RoleGate;

impl Gate for RoleGate {
    fn name(&self) -> &'static str {
        "role"
    }

    fn check(
        &self,
        route: &RouteDescriptor,
        _headers: &HeaderMap,
        ctx: &mut RequestContext,
    ) -> Result<(), GatewayError> {
        auth::authorize(ctx.claims.as_ref(), &route.allowed_roles)
    }
}
