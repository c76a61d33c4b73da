//! Shared utilities for the gateway integration tests.

use std::net::SocketAddr;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use url::Url;

use api_gateway::config::{
    CorsConfig, GatewayConfig, ObservabilityConfig, RateLimitConfig, ServiceUrls, TimeoutConfig,
};
use api_gateway::lifecycle::Shutdown;
use api_gateway::routing::RouteTable;
use api_gateway::HttpServer;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Config with every service pointed at the same backend address.
pub fn test_config(backend: SocketAddr) -> GatewayConfig {
    let base = Url::parse(&format!("http://{backend}")).unwrap();
    GatewayConfig {
        listen_addr: "127.0.0.1:0".into(),
        jwt_access_secret: TEST_SECRET.into(),
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
        rate_limit: RateLimitConfig {
            requests: 1000,
            window_secs: 60,
        },
        cors: CorsConfig::default(),
        timeouts: TimeoutConfig {
            forward_secs: 5,
            request_secs: 10,
        },
        max_body_bytes: 1024 * 1024,
        observability: ObservabilityConfig::default(),
    }
}

/// Start the gateway on an ephemeral port with the standard route table.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let table = Arc::new(RouteTable::standard(&config.services));
    let server = HttpServer::new(&config, table);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, &server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}

/// Mock backend that counts calls, captures the raw request head, and
/// answers with a canned response.
pub async fn start_mock_backend(
    body: &'static str,
) -> (SocketAddr, Arc<AtomicU32>, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let (tx, rx) = mpsc::unbounded_channel();

    let task_calls = calls.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    task_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        loop {
                            match socket.read(&mut chunk).await {
                                Ok(0) => break,
                                Ok(n) => {
                                    buf.extend_from_slice(&chunk[..n]);
                                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                                        break;
                                    }
                                }
                                Err(_) => break,
                            }
                        }
                        let _ = tx.send(String::from_utf8_lossy(&buf).to_string());

                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nx-backend: mock\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, calls, rx)
}

/// Mint an HS256 access token the way the auth service does.
pub fn mint_token(secret: &str, sub: &str, role: &str, ttl_secs: i64) -> String {
    #[derive(serde::Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        email: String,
        role: &'a str,
        iat: i64,
        exp: i64,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let claims = Claims {
        sub,
        email: format!("{sub}@example.com"),
        role,
        iat: now,
        exp: now + ttl_secs,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
