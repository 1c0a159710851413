// src/main.rs
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use stackprobe::config;
use stackprobe::server::{ReportHandler, Server};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stackprobe=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    let settings = config::load_settings()?;
    let addr: SocketAddr = settings.listen_addr.parse()?;
    info!("starting diagnostics server on {}", addr);

    let handler = ReportHandler::new(Arc::new(settings));
    let server = Server::new(addr, handler);

    tokio::select! {
        result = server.serve() => result?,
        _ = shutdown_signal() => {}
    }

    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
