//! Gateway error taxonomy and client-facing responses.
//!
//! # Design Decisions
//! - Every rejection maps to a JSON body `{"error": "<message>"}` and a
//!   specific status code; backend-originated errors never pass through here
//! - Signature and expiry failures share one client-facing message but stay
//!   distinguishable via [`CredentialFault`] for audit logging
//! - Internal faults return a generic message; detail goes to the log only

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Internal reason a credential failed verification.
///
/// Never surfaced to the client; logged so operators can tell a tampered
/// token from a stale one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFault {
    BadSignature,
    Expired,
    AlgorithmMismatch,
    MalformedToken,
}

impl CredentialFault {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialFault::BadSignature => "bad_signature",
            CredentialFault::Expired => "expired",
            CredentialFault::AlgorithmMismatch => "algorithm_mismatch",
            CredentialFault::MalformedToken => "malformed_token",
        }
    }
}

/// All failures the gateway itself can produce.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("No authentication token found")]
    MissingCredential,

    #[error("Invalid authorization header format")]
    MalformedCredential,

    /// Signature, expiry, algorithm and structural failures collapsed into
    /// one message on the wire.
    #[error("Invalid or expired token")]
    InvalidCredential(CredentialFault),

    #[error("Access denied")]
    Forbidden,

    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("No matching route found")]
    NotFound,

    #[error("Backend unreachable")]
    BackendUnreachable,

    #[error("Backend timed out")]
    BackendTimeout,

    #[error("Internal server error")]
    Internal,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingCredential
            | GatewayError::MalformedCredential
            | GatewayError::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::BackendUnreachable => StatusCode::BAD_GATEWAY,
            GatewayError::BackendTimeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label for logs and metrics. More specific than the client-facing
    /// message for credential faults.
    pub fn reason(&self) -> &'static str {
        match self {
            GatewayError::MissingCredential => "missing_credential",
            GatewayError::MalformedCredential => "malformed_credential",
            GatewayError::InvalidCredential(fault) => fault.as_str(),
            GatewayError::Forbidden => "forbidden",
            GatewayError::RateLimitExceeded { .. } => "rate_limited",
            GatewayError::NotFound => "not_found",
            GatewayError::BackendUnreachable => "backend_unreachable",
            GatewayError::BackendTimeout => "backend_timeout",
            GatewayError::Internal => "internal",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        let mut response = (status, body).into_response();

        if let GatewayError::RateLimitExceeded { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
