/**
 * Server Configuration
 *
 * Settings are read from environment variables with defaults suitable for
 * local development, or assembled in code through `ServerConfig::builder()`.
 *
 * # Variables
 *
 * | Variable           | Default    | Meaning                                   |
 * |--------------------|------------|-------------------------------------------|
 * | `SERVER_PORT`      | 3000       | listen port                               |
 * | `DATABASE_URL`     | unset      | Postgres URL; in-memory store when unset  |
 * | `JWT_SECRET`       | dev secret | HS256 signing secret                      |
 * | `STORE_TIMEOUT_MS` | 5000       | bound on every store call                 |
 * | `CONFLICT_RETRIES` | 3          | retries for a contended ordered write     |
 * | `OUTBOUND_BUFFER`  | 256        | per-connection realtime queue capacity    |
 *
 * A missing database is not an error: the server runs against the
 * in-memory store and says so in the log.
 */

use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

const DEV_SECRET: &str = "taskboard-development-secret";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub store_timeout: Duration,
    pub conflict_retries: u32,
    pub outbound_buffer: usize,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Some(port) = lookup("SERVER_PORT") {
            builder = builder.port(parse("SERVER_PORT", &port)?);
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            builder = builder.database_url(url);
        }
        match lookup("JWT_SECRET") {
            Some(secret) => builder = builder.jwt_secret(secret),
            None => {
                tracing::warn!("[Config] JWT_SECRET not set, using the development secret");
                builder = builder.jwt_secret(DEV_SECRET.to_string());
            }
        }
        if let Some(ms) = lookup("STORE_TIMEOUT_MS") {
            builder = builder.store_timeout(Duration::from_millis(parse("STORE_TIMEOUT_MS", &ms)?));
        }
        if let Some(retries) = lookup("CONFLICT_RETRIES") {
            builder = builder.conflict_retries(parse("CONFLICT_RETRIES", &retries)?);
        }
        if let Some(buffer) = lookup("OUTBOUND_BUFFER") {
            builder = builder.outbound_buffer(parse("OUTBOUND_BUFFER", &buffer)?);
        }

        builder.build()
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    store_timeout: Option<Duration>,
    conflict_retries: Option<u32>,
    outbound_buffer: Option<usize>,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database_url(mut self, url: String) -> Self {
        self.database_url = Some(url);
        self
    }

    pub fn jwt_secret(mut self, secret: String) -> Self {
        self.jwt_secret = Some(secret);
        self
    }

    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    pub fn conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = Some(retries);
        self
    }

    pub fn outbound_buffer(mut self, buffer: usize) -> Self {
        self.outbound_buffer = Some(buffer);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let jwt_secret = self.jwt_secret.unwrap_or_else(|| DEV_SECRET.to_string());
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }

        let store_timeout = self.store_timeout.unwrap_or(Duration::from_millis(5000));
        if store_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "STORE_TIMEOUT_MS",
                value: "0".to_string(),
            });
        }

        let outbound_buffer = self.outbound_buffer.unwrap_or(256);
        if outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                name: "OUTBOUND_BUFFER",
                value: "0".to_string(),
            });
        }

        Ok(ServerConfig {
            port: self.port.unwrap_or(3000),
            database_url: self.database_url,
            jwt_secret,
            store_timeout,
            conflict_retries: self.conflict_retries.unwrap_or(3),
            outbound_buffer,
        })
    }
}

/// Connect to Postgres and run the embedded migrations
///
/// Returns `None` when no URL is configured or the connection fails; the
/// caller falls back to the in-memory store.
pub async fn load_database(config: &ServerConfig) -> Option<PgPool> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("[Config] DATABASE_URL not set. Using the in-memory store.");
        return None;
    };

    tracing::info!("[Store] Connecting to database...");
    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("[Store] Failed to create database connection pool: {:?}", e);
            tracing::warn!("[Store] Falling back to the in-memory store.");
            return None;
        }
    };

    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("[Store] Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("[Store] Failed to run database migrations: {}", e);
            tracing::warn!("[Store] Continuing without migrations - schema might not be up to date");
        }
    }

    Some(pool)
}
