// src/probe/mod.rs
pub mod banner;
pub mod mysql;
pub mod postgres;
pub mod rabbitmq;
pub mod redis;

use crate::config::Settings;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-connect timeout applied to every probe.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Wall-clock budget for reading a service's response after connecting.
pub const READ_BUDGET: Duration = Duration::from_secs(2);

/// Why a probe could not produce its facts. An absent banner pattern is
/// never an error; the corresponding fact is simply `None`.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("read failed: {0}")]
    Read(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Uniform result record for one backing service. Always fully populated
/// before rendering, even when the probe failed.
#[derive(Debug, Clone)]
pub struct ServiceStatus {
    pub name: &'static str,
    pub connected: bool,
    pub error: Option<String>,
    pub version: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl ServiceStatus {
    fn connected(name: &'static str) -> Self {
        Self {
            name,
            connected: true,
            error: None,
            version: None,
            extra: BTreeMap::new(),
        }
    }

    fn from_error(name: &'static str, err: &ProbeError) -> Self {
        Self {
            name,
            // A read or query failure still means the connect itself worked.
            connected: !matches!(err, ProbeError::Connect(_)),
            error: Some(err.to_string()),
            version: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Snapshot of all four backing services, taken for a single request.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub generated_at: DateTime<Utc>,
    pub redis: ServiceStatus,
    pub mysql: ServiceStatus,
    pub postgres: ServiceStatus,
    pub rabbitmq: ServiceStatus,
}

impl ProbeReport {
    pub fn services(&self) -> [&ServiceStatus; 4] {
        [&self.redis, &self.mysql, &self.postgres, &self.rabbitmq]
    }
}

/// Run the four probes strictly in sequence and collapse each outcome into
/// a status record. One service's failure never affects another's probe and
/// never aborts the report; worst case is the sum of the per-probe timeouts.
pub async fn run_probes(settings: &Settings) -> ProbeReport {
    info!("running backing-service probes");

    let redis = {
        let started = std::time::Instant::now();
        let status = match redis::probe(&settings.redis).await {
            Ok(facts) => {
                let mut status = ServiceStatus::connected("Redis");
                status.version = facts.version;
                status
                    .extra
                    .insert("keys".to_string(), facts.keys.unwrap_or_else(|| "0".to_string()));
                status
            }
            Err(err) => {
                warn!(%err, "redis probe failed");
                ServiceStatus::from_error("Redis", &err)
            }
        };
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "redis probe done");
        status
    };

    let mysql = {
        let started = std::time::Instant::now();
        let status = match mysql::probe(&settings.mysql).await {
            Ok(facts) => {
                let mut status = ServiceStatus::connected("MySQL");
                status.version = Some(facts.version);
                status
                    .extra
                    .insert("database_count".to_string(), facts.databases.len().to_string());
                status
                    .extra
                    .insert("databases".to_string(), facts.databases.join(", "));
                status
            }
            Err(err) => {
                warn!(%err, "mysql probe failed");
                ServiceStatus::from_error("MySQL", &err)
            }
        };
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "mysql probe done");
        status
    };

    let postgres = {
        let started = std::time::Instant::now();
        let status = match postgres::probe(&settings.postgres).await {
            Ok(facts) => {
                let mut status = ServiceStatus::connected("PostgreSQL");
                status.version = facts.version;
                status.extra.insert(
                    "connection_string".to_string(),
                    postgres::redacted_descriptor(&settings.postgres),
                );
                status
                    .extra
                    .insert("database_count".to_string(), facts.databases.len().to_string());
                status
                    .extra
                    .insert("databases".to_string(), facts.databases.join(", "));
                status
            }
            Err(err) => {
                warn!(%err, "postgres probe failed");
                let mut status = ServiceStatus::from_error("PostgreSQL", &err);
                // This backend's failures are the least self-describing, so
                // attach the redacted descriptor and the resolved config
                // values to give the operator something to work with.
                status.extra.insert(
                    "connection_string".to_string(),
                    postgres::redacted_descriptor(&settings.postgres),
                );
                status.extra.insert(
                    "debug_info".to_string(),
                    serde_json::to_string_pretty(&postgres::debug_bundle(&settings.postgres))
                        .unwrap_or_default(),
                );
                status
            }
        };
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "postgres probe done");
        status
    };

    let rabbitmq = {
        let started = std::time::Instant::now();
        let status = match rabbitmq::probe(&settings.rabbitmq).await {
            Ok(facts) => {
                let mut status = ServiceStatus::connected("RabbitMQ");
                status
                    .extra
                    .insert("management_url".to_string(), facts.management_url.to_string());
                status
            }
            Err(err) => {
                warn!(%err, "rabbitmq probe failed");
                ServiceStatus::from_error("RabbitMQ", &err)
            }
        };
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "rabbitmq probe done");
        status
    };

    let healthy = [&redis, &mysql, &postgres, &rabbitmq]
        .iter()
        .filter(|s| s.connected && s.error.is_none())
        .count();
    info!("probe pass complete: {} of 4 services healthy", healthy);

    ProbeReport {
        generated_at: Utc::now(),
        redis,
        mysql,
        postgres,
        rabbitmq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_failure_still_counts_as_connected() {
        let status = ServiceStatus::from_error("Redis", &ProbeError::Read("boom".to_string()));
        assert!(status.connected);
        assert_eq!(status.error.as_deref(), Some("read failed: boom"));
    }

    #[test]
    fn connect_failure_is_not_connected() {
        let status =
            ServiceStatus::from_error("Redis", &ProbeError::Connect("refused".to_string()));
        assert!(!status.connected);
        assert!(status.error.as_deref().unwrap().contains("refused"));
    }
}
