//! Structured logging.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber. `RUST_LOG` wins when set; otherwise
/// the configured level applies to the gateway and its HTTP middleware.
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("api_gateway={default_level},tower_http={default_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
