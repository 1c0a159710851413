// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment};

/// Load settings from environment variables, falling back to the fixed
/// defaults of the deployment template for anything unset.
pub fn load_settings() -> Result<Settings> {
    let raw: RawSettings = defaults()
        .and_then(|builder| builder.add_source(Environment::default()).build())
        .and_then(Config::try_deserialize)
        .context("Failed to read configuration from environment")?;

    let settings = Settings::from(raw);
    settings.validate()?;
    Ok(settings)
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("listen_addr", "0.0.0.0:8080")?
        .set_default("redis_host", "redis")?
        .set_default("redis_port", 6379)?
        .set_default("mysql_host", "mysql")?
        .set_default("mysql_port", 3306)?
        .set_default("mysql_user", "test")?
        .set_default("mysql_password", "test123")?
        .set_default("mysql_database", "test")?
        .set_default("postgres_host", "postgresql")?
        .set_default("postgres_port", 5432)?
        .set_default("postgres_user", "postgres")?
        .set_default("postgres_password", "password")?
        .set_default("postgres_db", "test")?
        .set_default("rabbitmq_host", "rabbitmq")?
        .set_default("rabbitmq_port", 5672)?
        .set_default("rabbitmq_management_port", 15672)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_from_defaults() -> Settings {
        let raw: RawSettings = defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        Settings::from(raw)
    }

    #[test]
    fn defaults_match_deployment_template() {
        let settings = settings_from_defaults();
        assert_eq!(settings.listen_addr, "0.0.0.0:8080");
        assert_eq!(settings.redis.host, "redis");
        assert_eq!(settings.redis.port, 6379);
        assert_eq!(settings.mysql.user, "test");
        assert_eq!(settings.mysql.password, "test123");
        assert_eq!(settings.postgres.host, "postgresql");
        assert_eq!(settings.postgres.database, "test");
        assert_eq!(settings.rabbitmq.management_port, 15672);
    }

    #[test]
    fn string_ports_coerce_to_u16() {
        // Environment values arrive as strings; the deserializer must coerce.
        let raw: RawSettings = defaults()
            .unwrap()
            .set_override("mysql_port", "3307")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(Settings::from(raw).mysql.port, 3307);
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(settings_from_defaults().validate().is_ok());
    }
}
