//! Configuration schema definitions.

use url::Url;

/// Root configuration for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub listen_addr: String,

    /// HMAC secret used to verify access tokens.
    pub jwt_access_secret: String,

    /// Base URLs of the downstream services.
    pub services: ServiceUrls,

    /// Rate limiting settings.
    pub rate_limit: RateLimitConfig,

    /// CORS allow-lists.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Maximum inbound request body size in bytes.
    pub max_body_bytes: usize,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Base URLs of the eight downstream services the gateway fronts.
#[derive(Debug, Clone)]
pub struct ServiceUrls {
    pub auth: Url,
    pub schedule: Url,
    pub booking: Url,
    pub ticket: Url,
    pub user: Url,
    pub search: Url,
    pub admin: Url,
    pub reporting: Url,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per client key per window.
    pub requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 100,
            window_secs: 60,
        }
    }
}

/// CORS allow-lists, as configured (unparsed).
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3001".to_string(),
                "http://localhost:5173".to_string(),
            ],
            allowed_methods: ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Budget for one backend call in seconds.
    pub forward_secs: u64,

    /// Outer budget for the whole request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            forward_secs: 30,
            request_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log level used as the EnvFilter fallback (trace, debug, info, warn,
    /// error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
