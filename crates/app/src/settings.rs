//! Application settings.
//!
//! Read from an optional `settings.{toml,yaml,json}` in the working directory,
//! then overridden by `COOWN__<SECTION>__<KEY>` environment variables
//! (e.g. `COOWN__AUTH__SECRET`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub secret: String,
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(Environment::with_prefix("COOWN").separator("__")),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = builder
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .set_default("auth.token_ttl_minutes", 1440)?
            .build()?
            .try_deserialize()?;

        if settings.auth.secret.trim().is_empty() {
            return Err(ConfigError::Message("auth.secret must not be empty".to_string()));
        }
        if settings.auth.token_ttl_minutes <= 0 {
            return Err(ConfigError::Message(
                "auth.token_ttl_minutes must be > 0".to_string(),
            ));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn defaults_fill_missing_keys() {
        let settings = from_toml(
            r#"
            [auth]
            secret = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(settings.auth.token_ttl_minutes, 1440);
    }

    #[test]
    fn sqlite_database_path() {
        let settings = from_toml(
            r#"
            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { sqlite = "data/coown.db" }

            [auth]
            secret = "s3cret"
            token_ttl_minutes = 30
            "#,
        )
        .unwrap();
        assert_eq!(settings.server.bind, "0.0.0.0");
        assert_eq!(
            settings.server.database,
            Database::Sqlite("data/coown.db".to_string())
        );
        assert_eq!(settings.auth.token_ttl_minutes, 30);
    }

    #[test]
    fn secret_is_required() {
        assert!(from_toml("").is_err());
        assert!(from_toml("[auth]\nsecret = \"  \"").is_err());
    }
}
