//! Process signal handling.

use tracing::info;

/// Wait for SIGINT or SIGTERM (Ctrl+C on non-unix platforms).
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sig_int =
            signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut sig_term =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = sig_int.recv() => info!("received SIGINT, starting graceful shutdown"),
            _ = sig_term.recv() => info!("received SIGTERM, starting graceful shutdown"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, starting graceful shutdown");
    }
}
