// src/probe/redis.rs
use super::{banner, ProbeError, CONNECT_TIMEOUT, READ_BUDGET};
use crate::config::RedisEndpoint;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RedisFacts {
    pub version: Option<String>,
    pub keys: Option<String>,
}

/// Raw-socket liveness probe: connect, PING, then read the `INFO server`
/// response until end-of-stream or the read budget runs out. The socket is
/// dropped on every exit path.
pub async fn probe(endpoint: &RedisEndpoint) -> Result<RedisFacts, ProbeError> {
    let addr = format!("{}:{}", endpoint.host, endpoint.port);
    debug!(%addr, "probing redis");

    let mut stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr))
        .await
        .map_err(|_| ProbeError::Connect(format!("connect to {addr} timed out")))?
        .map_err(|e| ProbeError::Connect(e.to_string()))?;

    stream
        .write_all(b"PING\r\n")
        .await
        .map_err(|e| ProbeError::Read(e.to_string()))?;

    let mut reply = [0u8; 512];
    let n = timeout(READ_BUDGET, stream.read(&mut reply))
        .await
        .map_err(|_| ProbeError::Read("timed out waiting for PING reply".to_string()))?
        .map_err(|e| ProbeError::Read(e.to_string()))?;
    if n == 0 {
        return Err(ProbeError::Read("connection closed before PING reply".to_string()));
    }

    stream
        .write_all(b"INFO server\r\n")
        .await
        .map_err(|e| ProbeError::Read(e.to_string()))?;

    let info = read_until_budget(&mut stream).await?;

    Ok(RedisFacts {
        version: banner::redis_version(&info),
        keys: banner::redis_db0_keys(&info),
    })
}

/// Accumulate response chunks until EOF or the wall-clock budget expires.
/// A mid-stream read error after the first chunk keeps the partial text;
/// an error before any data arrived is a read failure.
async fn read_until_budget(stream: &mut TcpStream) -> Result<String, ProbeError> {
    let deadline = Instant::now() + READ_BUDGET;
    let mut body = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match timeout(remaining, stream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => body.extend_from_slice(&chunk[..n]),
            Ok(Err(e)) => {
                if body.is_empty() {
                    return Err(ProbeError::Read(e.to_string()));
                }
                break;
            }
            Err(_) => break, // budget spent; keep what we have
        }
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}
