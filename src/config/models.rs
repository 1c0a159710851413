// src/config/models.rs
use anyhow::{bail, Result};
use serde::Deserialize;

/// Flat mirror of the environment variable names (`REDIS_HOST`,
/// `MYSQL_PASSWORD`, ...) that the `config` crate deserializes into.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawSettings {
    pub listen_addr: String,
    pub redis_host: String,
    pub redis_port: u16,
    pub mysql_host: String,
    pub mysql_port: u16,
    pub mysql_user: String,
    pub mysql_password: String,
    pub mysql_database: String,
    pub postgres_host: String,
    pub postgres_port: u16,
    pub postgres_user: String,
    pub postgres_password: String,
    pub postgres_db: String,
    pub rabbitmq_host: String,
    pub rabbitmq_port: u16,
    pub rabbitmq_management_port: u16,
}

/// Resolved configuration, read-only for the lifetime of a request.
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen_addr: String,
    pub redis: RedisEndpoint,
    pub mysql: MysqlEndpoint,
    pub postgres: PostgresEndpoint,
    pub rabbitmq: RabbitMqEndpoint,
}

#[derive(Debug, Clone)]
pub struct RedisEndpoint {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct MysqlEndpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct PostgresEndpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct RabbitMqEndpoint {
    pub host: String,
    pub port: u16,
    pub management_port: u16,
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        Self {
            listen_addr: raw.listen_addr,
            redis: RedisEndpoint {
                host: raw.redis_host,
                port: raw.redis_port,
            },
            mysql: MysqlEndpoint {
                host: raw.mysql_host,
                port: raw.mysql_port,
                user: raw.mysql_user,
                password: raw.mysql_password,
                database: raw.mysql_database,
            },
            postgres: PostgresEndpoint {
                host: raw.postgres_host,
                port: raw.postgres_port,
                user: raw.postgres_user,
                password: raw.postgres_password,
                database: raw.postgres_db,
            },
            rabbitmq: RabbitMqEndpoint {
                host: raw.rabbitmq_host,
                port: raw.rabbitmq_port,
                management_port: raw.rabbitmq_management_port,
            },
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            bail!("LISTEN_ADDR is not a valid socket address: {}", self.listen_addr);
        }
        for (name, host) in [
            ("REDIS_HOST", &self.redis.host),
            ("MYSQL_HOST", &self.mysql.host),
            ("POSTGRES_HOST", &self.postgres.host),
            ("RABBITMQ_HOST", &self.rabbitmq.host),
        ] {
            if host.is_empty() {
                bail!("{} must not be empty", name);
            }
        }
        Ok(())
    }
}
