use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;

use crate::error::{ServiceError, ServiceResult};

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Address the web server binds to.
    ///
    /// Field name: `HOST`
    pub host: String,

    /// The application port.
    ///
    /// Field name: `PORT`
    pub port: u16,

    /// Database connection settings.
    pub database: DatabaseConfig,
}

/// Where to find the PostgreSQL server.
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseConfig {
    /// Database connection string.
    ///
    /// Field name: `DATABASE_URL`
    Url(String),

    /// Individual connection parameters, used when `DATABASE_URL` is unset.
    ///
    /// Field names: `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`
    Parameters {
        host: String,
        port: u16,
        user: String,
        password: String,
        name: String,
    },
}

impl Config {
    pub fn from_env() -> ServiceResult<Config> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ServiceResult<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let database = match lookup("DATABASE_URL") {
            Some(url) => DatabaseConfig::Url(url),
            None => DatabaseConfig::Parameters {
                host: value("DB_HOST", "localhost"),
                port: parse("DB_PORT", &value("DB_PORT", "5432"))?,
                user: value("DB_USER", "postgres"),
                password: value("DB_PASSWORD", ""),
                name: value("DB_NAME", "cafe"),
            },
        };

        Ok(Config {
            host: value("HOST", "0.0.0.0"),
            port: parse("PORT", &value("PORT", "5000"))?,
            database,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> ServiceResult<PgConnectOptions> {
        match self {
            DatabaseConfig::Url(url) => PgConnectOptions::from_str(url).map_err(ServiceError::from),
            DatabaseConfig::Parameters {
                host,
                port,
                user,
                password,
                name,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(name)),
        }
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> ServiceResult<T> {
    raw.trim().parse().map_err(|_| {
        ServiceError::InternalServerError(format!("Invalid value for {key}: '{raw}'"))
    })
}
