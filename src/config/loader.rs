//! Configuration loading from the process environment.

use std::env;

use url::Url;

use crate::config::schema::{
    CorsConfig, GatewayConfig, ObservabilityConfig, RateLimitConfig, ServiceUrls, TimeoutConfig,
};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    InvalidUrl {
        var: &'static str,
        value: String,
        source: url::ParseError,
    },
    InvalidNumber {
        var: &'static str,
        value: String,
    },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidUrl { var, value, source } => {
                write!(f, "{var}: invalid URL '{value}': {source}")
            }
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var}: invalid number '{value}'")
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate the configuration from environment variables, with
/// documented defaults for local development.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    let port = get_env("PORT", "3000");

    let config = GatewayConfig {
        listen_addr: format!("0.0.0.0:{port}"),
        jwt_access_secret: get_env("JWT_ACCESS_SECRET", "your-secret-key-change-in-production"),
        services: ServiceUrls {
            auth: parse_url("AUTH_SERVICE_URL", "http://localhost:3001")?,
            schedule: parse_url("SCHEDULE_SERVICE_URL", "http://localhost:3002")?,
            booking: parse_url("BOOKING_SERVICE_URL", "http://localhost:3005")?,
            ticket: parse_url("TICKET_SERVICE_URL", "http://localhost:3006")?,
            user: parse_url("USER_SERVICE_URL", "http://localhost:3008")?,
            search: parse_url("SEARCH_SERVICE_URL", "http://localhost:3009")?,
            admin: parse_url("ADMIN_SERVICE_URL", "http://localhost:3010")?,
            reporting: parse_url("REPORTING_SERVICE_URL", "http://localhost:3011")?,
        },
        rate_limit: RateLimitConfig {
            requests: parse_number("RATE_LIMIT_REQUESTS", "100")?,
            window_secs: parse_number("RATE_LIMIT_WINDOW_SECONDS", "60")?,
        },
        cors: CorsConfig {
            allowed_origins: split_csv(&get_env(
                "CORS_ALLOWED_ORIGINS",
                "http://localhost:3001,http://localhost:5173",
            )),
            allowed_methods: split_csv(&get_env(
                "CORS_ALLOWED_METHODS",
                "GET,POST,PUT,PATCH,DELETE,OPTIONS",
            )),
            allowed_headers: split_csv(&get_env(
                "CORS_ALLOWED_HEADERS",
                "Content-Type,Authorization",
            )),
        },
        timeouts: TimeoutConfig {
            forward_secs: parse_number("FORWARD_TIMEOUT_SECONDS", "30")?,
            request_secs: parse_number("REQUEST_TIMEOUT_SECONDS", "60")?,
        },
        max_body_bytes: parse_number("MAX_BODY_BYTES", "2097152")?,
        observability: ObservabilityConfig {
            log_level: get_env("LOG_LEVEL", "info"),
            metrics_enabled: get_env("METRICS_ENABLED", "false") == "true",
            metrics_address: get_env("METRICS_ADDR", "0.0.0.0:9090"),
        },
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn get_env(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn parse_url(var: &'static str, default: &str) -> Result<Url, ConfigError> {
    let value = get_env(var, default);
    Url::parse(&value).map_err(|source| ConfigError::InvalidUrl { var, value, source })
}

fn parse_number<T: std::str::FromStr>(var: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = get_env(var, default);
    value
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { var, value })
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
