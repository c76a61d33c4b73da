//! CORS policy assembled from the configured allow-lists.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::config::CorsConfig;

/// Build the CORS layer. Entries that fail to parse are skipped with a
/// warning rather than aborting startup.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = parse_list(&config.allowed_origins, "origin");
    let methods: Vec<Method> = parse_list(&config.allowed_methods, "method");
    let headers: Vec<HeaderName> = parse_list(&config.allowed_headers, "header");

    // Credentials are allowed because the access token travels in a cookie.
    // tower-http forbids the wildcard origin in that mode, which is why the
    // origin list is always explicit.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}

fn parse_list<T: std::str::FromStr>(values: &[String], kind: &'static str) -> Vec<T> {
    values
        .iter()
        .filter_map(|raw| match raw.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!(value = %raw, kind, "ignoring unparseable CORS entry");
                None
            }
        })
        .collect()
}
