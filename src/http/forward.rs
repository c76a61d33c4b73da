//! Transparent request forwarding to backend services.
//!
//! # Responsibilities
//! - Rebuild the inbound request against the backend base URL
//! - Strip hop-by-hop headers; pass everything else through, including
//!   `Authorization` and cookies
//! - Inject gateway-verified identity headers on authenticated routes
//! - Stream the backend response back byte-for-byte
//!
//! # Design Decisions
//! - Bodies are streamed in both directions, never buffered
//! - Backend 4xx/5xx pass through untouched; only transport-level failures
//!   become gateway errors (502/504)
//! - Every backend call is bounded by a timeout so one hung service cannot
//!   pin a client connection

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request, Response, Uri},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::auth::TokenClaims;
use crate::error::GatewayError;

/// Identity headers trusted by backends because only the gateway sets them.
pub const X_USER_ID: &str = "x-user-id";
pub const X_USER_EMAIL: &str = "x-user-email";
pub const X_USER_ROLE: &str = "x-user-role";

/// Pure I/O relay: replays a request against a backend and hands the
/// response back unchanged.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }

    /// Forward `request` to `backend`, attaching `identity` headers when the
    /// pipeline verified a token.
    pub async fn forward(
        &self,
        mut request: Request<Body>,
        backend: &Url,
        identity: Option<&TokenClaims>,
    ) -> Result<Response<Body>, GatewayError> {
        let uri = backend_uri(backend, request.uri())?;
        *request.uri_mut() = uri;

        let headers = request.headers_mut();
        strip_hop_by_hop(headers);
        // The client must not be able to smuggle identity past the gateway.
        strip_identity(headers);
        // Let the client stack derive Host from the backend authority.
        headers.remove(header::HOST);
        if let Some(claims) = identity {
            inject_identity(headers, claims)?;
        }

        match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let (parts, body) = response.into_parts();
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, backend = %backend, "backend request failed");
                Err(GatewayError::BackendUnreachable)
            }
            Err(_) => {
                tracing::error!(backend = %backend, timeout = ?self.timeout, "backend timed out");
                Err(GatewayError::BackendTimeout)
            }
        }
    }
}

/// Headers meaningful only for a single hop.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    headers.remove(header::CONNECTION);
    headers.remove(header::PROXY_AUTHENTICATE);
    headers.remove(header::PROXY_AUTHORIZATION);
    headers.remove(header::TE);
    headers.remove(header::TRAILER);
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::UPGRADE);
    headers.remove("keep-alive");
}

fn strip_identity(headers: &mut HeaderMap) {
    headers.remove(X_USER_ID);
    headers.remove(X_USER_EMAIL);
    headers.remove(X_USER_ROLE);
}

fn inject_identity(headers: &mut HeaderMap, claims: &TokenClaims) -> Result<(), GatewayError> {
    let pairs = [
        (X_USER_ID, &claims.subject),
        (X_USER_EMAIL, &claims.email),
        (X_USER_ROLE, &claims.role),
    ];
    for (name, value) in pairs {
        let value = HeaderValue::from_str(value).map_err(|_| {
            tracing::error!(header = name, "claim not representable as a header value");
            GatewayError::Internal
        })?;
        headers.insert(name, value);
    }
    Ok(())
}

fn backend_uri(backend: &Url, original: &Uri) -> Result<Uri, GatewayError> {
    let path_and_query = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let base = backend.as_str().trim_end_matches('/');

    format!("{base}{path_and_query}").parse().map_err(|err| {
        tracing::error!(error = %err, backend = %backend, "failed to build backend URI");
        GatewayError::Internal
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_uri_keeps_path_and_query() {
        let backend = Url::parse("http://localhost:3002").unwrap();
        let original: Uri = "/api/trains?limit=10".parse().unwrap();
        let uri = backend_uri(&backend, &original).unwrap();
        assert_eq!(uri.to_string(), "http://localhost:3002/api/trains?limit=10");
    }

    #[test]
    fn backend_uri_tolerates_trailing_slash_on_base() {
        let backend = Url::parse("http://localhost:3002/").unwrap();
        let original: Uri = "/api/trains".parse().unwrap();
        let uri = backend_uri(&backend, &original).unwrap();
        assert_eq!(uri.to_string(), "http://localhost:3002/api/trains");
    }

    #[test]
    fn hop_by_hop_headers_are_stripped_but_auth_survives() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        headers.insert(header::COOKIE, HeaderValue::from_static("accessToken=t"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get(header::TRANSFER_ENCODING).is_none());
        assert!(headers.get(header::AUTHORIZATION).is_some());
        assert!(headers.get(header::COOKIE).is_some());
    }

    #[test]
    fn client_supplied_identity_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(X_USER_ID, HeaderValue::from_static("spoofed"));
        headers.insert(X_USER_ROLE, HeaderValue::from_static("ADMIN"));

        strip_identity(&mut headers);
        let claims = TokenClaims {
            subject: "user-9".into(),
            email: "u9@example.com".into(),
            role: "USER".into(),
        };
        inject_identity(&mut headers, &claims).unwrap();

        assert_eq!(headers.get(X_USER_ID).unwrap(), "user-9");
        assert_eq!(headers.get(X_USER_EMAIL).unwrap(), "u9@example.com");
        assert_eq!(headers.get(X_USER_ROLE).unwrap(), "USER");
    }
}
