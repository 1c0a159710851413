// src/probe/mysql.rs
use super::{ProbeError, CONNECT_TIMEOUT};
use crate::config::MysqlEndpoint;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder};
use tokio::time::timeout;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MysqlFacts {
    pub version: String,
    pub databases: Vec<String>,
}

/// Client-connection probe. Deliberately connects without selecting a
/// database so `SHOW DATABASES` reflects everything the account can see.
pub async fn probe(endpoint: &MysqlEndpoint) -> Result<MysqlFacts, ProbeError> {
    debug!(host = %endpoint.host, port = endpoint.port, "probing mysql");

    let opts: Opts = OptsBuilder::default()
        .ip_or_hostname(endpoint.host.clone())
        .tcp_port(endpoint.port)
        .user(Some(endpoint.user.clone()))
        .pass(Some(endpoint.password.clone()))
        .into();

    let mut conn = timeout(CONNECT_TIMEOUT, Conn::new(opts))
        .await
        .map_err(|_| {
            ProbeError::Connect(format!(
                "connect to {}:{} timed out",
                endpoint.host, endpoint.port
            ))
        })?
        .map_err(|e| ProbeError::Connect(e.to_string()))?;

    let (version, databases) = match query_facts(&mut conn).await {
        Ok(facts) => facts,
        Err(err) => {
            // Close the session before surfacing the query failure.
            let _ = conn.disconnect().await;
            return Err(err);
        }
    };

    conn.disconnect()
        .await
        .map_err(|e| ProbeError::Query(e.to_string()))?;

    Ok(MysqlFacts { version, databases })
}

async fn query_facts(conn: &mut Conn) -> Result<(String, Vec<String>), ProbeError> {
    let (major, minor, patch) = conn.server_version();
    let version = format!("{major}.{minor}.{patch}");

    let databases: Vec<String> = conn
        .query("SHOW DATABASES")
        .await
        .map_err(|e| ProbeError::Query(e.to_string()))?;

    Ok((version, databases))
}
