// src/probe/rabbitmq.rs
use super::{ProbeError, CONNECT_TIMEOUT};
use crate::config::RabbitMqEndpoint;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct RabbitMqFacts {
    pub management_url: Url,
}

/// Reachability-only probe of the AMQP port. No handshake is performed;
/// an accepted TCP connection alone counts as connected. The management
/// console URL is derived for display, not contacted.
pub async fn probe(endpoint: &RabbitMqEndpoint) -> Result<RabbitMqFacts, ProbeError> {
    let addr = format!("{}:{}", endpoint.host, endpoint.port);
    debug!(%addr, "probing rabbitmq");

    let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr))
        .await
        .map_err(|_| ProbeError::Connect(format!("connect to {addr} timed out")))?
        .map_err(|e| ProbeError::Connect(e.to_string()))?;
    drop(stream);

    let management_url = Url::parse(&format!(
        "http://{}:{}",
        endpoint.host, endpoint.management_port
    ))
    .map_err(|e| ProbeError::Connect(format!("invalid management url: {e}")))?;

    Ok(RabbitMqFacts { management_url })
}
