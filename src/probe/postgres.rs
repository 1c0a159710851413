// src/probe/postgres.rs
use super::{banner, ProbeError, CONNECT_TIMEOUT};
use crate::config::PostgresEndpoint;
use serde_json::json;
use tokio::time::timeout;
use tokio_postgres::NoTls;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PostgresFacts {
    pub version: Option<String>,
    pub databases: Vec<String>,
}

/// The credential mask used anywhere a descriptor is shown to an operator.
const PASSWORD_MASK: &str = "***";

/// libpq-style key=value connection descriptor.
pub fn descriptor(endpoint: &PostgresEndpoint) -> String {
    format!(
        "host={} port={} user={} password={} dbname={}",
        endpoint.host, endpoint.port, endpoint.user, endpoint.password, endpoint.database
    )
}

/// Same descriptor with the password replaced by the mask, safe for display.
pub fn redacted_descriptor(endpoint: &PostgresEndpoint) -> String {
    format!(
        "host={} port={} user={} password={} dbname={}",
        endpoint.host, endpoint.port, endpoint.user, PASSWORD_MASK, endpoint.database
    )
}

/// Resolved config values plus the raw env vars, shown on failure to help
/// operators spot a mis-set variable. Never includes the password.
pub fn debug_bundle(endpoint: &PostgresEndpoint) -> serde_json::Value {
    json!({
        "host": endpoint.host,
        "port": endpoint.port,
        "user": endpoint.user,
        "database": endpoint.database,
        "env_USER": std::env::var("POSTGRES_USER").ok(),
        "env_DB": std::env::var("POSTGRES_DB").ok(),
    })
}

/// Client-connection probe: connect with the full descriptor, read the
/// version banner, then list non-template databases.
pub async fn probe(endpoint: &PostgresEndpoint) -> Result<PostgresFacts, ProbeError> {
    debug!(host = %endpoint.host, port = endpoint.port, "probing postgres");

    let (client, connection) = timeout(
        CONNECT_TIMEOUT,
        tokio_postgres::connect(&descriptor(endpoint), NoTls),
    )
    .await
    .map_err(|_| {
        ProbeError::Connect(format!(
            "connect to {}:{} timed out",
            endpoint.host, endpoint.port
        ))
    })?
    .map_err(|e| ProbeError::Connect(e.to_string()))?;

    // The connection future drives the socket; it resolves once the client
    // is dropped, on success and failure alike.
    let driver = tokio::spawn(connection);

    let result = query_facts(&client).await;
    drop(client);
    driver.abort();

    result
}

async fn query_facts(client: &tokio_postgres::Client) -> Result<PostgresFacts, ProbeError> {
    let banner_row = client
        .query_one("SELECT version()", &[])
        .await
        .map_err(|e| ProbeError::Query(e.to_string()))?;
    let version_banner: String = banner_row.get(0);

    let rows = client
        .query(
            "SELECT datname FROM pg_database WHERE datistemplate = false",
            &[],
        )
        .await
        .map_err(|e| ProbeError::Query(e.to_string()))?;
    let databases = rows.iter().map(|row| row.get(0)).collect();

    Ok(PostgresFacts {
        version: banner::postgres_version(&version_banner),
        databases,
    })
}
