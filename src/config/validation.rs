//! Semantic validation of the loaded configuration and route table.
//!
//! Serde-free by design: the loader handles syntax, this module handles
//! meaning. All errors are collected and returned together, not just the
//! first.

use crate::config::schema::GatewayConfig;
use crate::routing::RouteTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    ZeroValue { field: &'static str },
    UnsupportedScheme { field: &'static str, url: String },
    MissingHost { field: &'static str, url: String },
    EmptySecret,
    RolesWithoutAuth { route: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::ZeroValue { field } => {
                write!(f, "{field} must be greater than zero")
            }
            ValidationError::UnsupportedScheme { field, url } => {
                write!(f, "{field}: unsupported scheme in '{url}' (expected http or https)")
            }
            ValidationError::MissingHost { field, url } => {
                write!(f, "{field}: no host in '{url}'")
            }
            ValidationError::EmptySecret => write!(f, "JWT access secret must not be empty"),
            ValidationError::RolesWithoutAuth { route } => {
                write!(
                    f,
                    "route '{route}' restricts roles but does not require authentication"
                )
            }
        }
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.jwt_access_secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if config.rate_limit.requests == 0 {
        errors.push(ValidationError::ZeroValue { field: "rate_limit.requests" });
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "rate_limit.window_secs" });
    }
    if config.timeouts.forward_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "timeouts.forward_secs" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "timeouts.request_secs" });
    }
    if config.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue { field: "max_body_bytes" });
    }

    let services = [
        ("services.auth", &config.services.auth),
        ("services.schedule", &config.services.schedule),
        ("services.booking", &config.services.booking),
        ("services.ticket", &config.services.ticket),
        ("services.user", &config.services.user),
        ("services.search", &config.services.search),
        ("services.admin", &config.services.admin),
        ("services.reporting", &config.services.reporting),
    ];
    for (field, url) in services {
        if !matches!(url.scheme(), "http" | "https") {
            errors.push(ValidationError::UnsupportedScheme {
                field,
                url: url.to_string(),
            });
        }
        if url.host_str().is_none() {
            errors.push(ValidationError::MissingHost {
                field,
                url: url.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Authorization without prior authentication is meaningless; catch the
/// misconfiguration at startup instead of branching on it per request.
pub fn validate_table(table: &RouteTable) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = table
        .routes()
        .iter()
        .filter(|route| !route.allowed_roles.is_empty() && !route.requires_auth)
        .map(|route| ValidationError::RolesWithoutAuth {
            route: format!("{} {}", route.method, route.pattern.as_str()),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{
        CorsConfig, ObservabilityConfig, RateLimitConfig, ServiceUrls, TimeoutConfig,
    };
    use crate::routing::{RouteDescriptor, RouteTable};
    use axum::http::Method;
    use url::Url;

    fn test_config() -> GatewayConfig {
        let base = Url::parse("http://localhost:3001").unwrap();
        GatewayConfig {
            listen_addr: "0.0.0.0:3000".into(),
            jwt_access_secret: "secret".into(),
            services: ServiceUrls {
                auth: base.clone(),
                schedule: base.clone(),
                booking: base.clone(),
                ticket: base.clone(),
                user: base.clone(),
                search: base.clone(),
                admin: base.clone(),
                reporting: base,
            },
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::default(),
            timeouts: TimeoutConfig::default(),
            max_body_bytes: 1024,
            observability: ObservabilityConfig::default(),
        }
    }

    #[test]
    fn default_shape_is_valid() {
        assert!(validate_config(&test_config()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = test_config();
        config.jwt_access_secret.clear();
        config.rate_limit.requests = 0;
        config.rate_limit.window_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::EmptySecret));
    }

    #[test]
    fn rejects_non_http_service_url() {
        let mut config = test_config();
        config.services.booking = Url::parse("ftp://localhost:3005").unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::UnsupportedScheme { field: "services.booking", .. }]
        ));
    }

    #[test]
    fn table_invariant_roles_imply_auth() {
        let backend = Url::parse("http://localhost:3010").unwrap();
        let good = RouteTable::new(vec![RouteDescriptor::restricted(
            Method::GET,
            "/api/admin/users",
            &backend,
            &["ADMIN"],
        )]);
        assert!(validate_table(&good).is_ok());

        let mut broken_route =
            RouteDescriptor::restricted(Method::GET, "/api/admin/users", &backend, &["ADMIN"]);
        broken_route.requires_auth = false;
        let broken = RouteTable::new(vec![broken_route]);
        let errors = validate_table(&broken).unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
