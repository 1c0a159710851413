// src/server/mod.rs
pub mod handler;

pub use handler::ReportHandler;

use anyhow::{Context, Result};
use hyper::server::conn::Http;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Accept loop for the diagnostics page: one Tokio task per connection,
/// each serving a clone of the injected handler.
pub struct Server {
    addr: SocketAddr,
    handler: ReportHandler,
}

impl Server {
    pub fn new(addr: SocketAddr, handler: ReportHandler) -> Self {
        Self { addr, handler }
    }

    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;
        info!("diagnostics server listening on http://{}", self.addr);

        loop {
            let (stream, peer) = listener.accept().await?;
            let svc = self.handler.clone();

            tokio::spawn(async move {
                if let Err(err) = Http::new().serve_connection(stream, svc).await {
                    warn!(%peer, %err, "connection error");
                }
            });
        }
    }
}
