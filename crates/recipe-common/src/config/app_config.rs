//! Process configuration.
//!
//! All settings come from environment variables (a `.env` file is honored
//! when present). Each section has working development defaults; only the
//! values that name external resources or secrets are required.

use std::env;
use std::str::FromStr;

/// Read an env var and parse it, falling back when unset or unparsable
fn parsed_or<T: FromStr>(key: &str, fallback: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(fallback)
}

/// Read a required env var
fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVar(key))
}

/// Top-level configuration for the process
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub moderation: ModerationConfig,
}

impl AppConfig {
    /// Assemble configuration from the environment.
    ///
    /// # Errors
    /// Fails when a required variable (`SERVER_PORT`, `DATABASE_URL`,
    /// `REDIS_URL`, `JWT_SECRET`) is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| "recipe-server".into()),
                env: parsed_or("APP_ENV", Environment::Development),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
                port: {
                    let raw = required("SERVER_PORT")?;
                    raw.parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT", raw.clone()))?
                },
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 20),
                min_connections: parsed_or("DATABASE_MIN_CONNECTIONS", 5),
            },
            redis: RedisConfig {
                url: required("REDIS_URL")?,
                max_connections: parsed_or("REDIS_MAX_CONNECTIONS", 10),
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                token_expiry: parsed_or("JWT_TOKEN_EXPIRY", 86400),
            },
            moderation: ModerationConfig::from_env(),
        })
    }
}

/// Process identity and runtime environment
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// Bind address of the WebSocket/health endpoint
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// PostgreSQL settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis settings
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Bearer-token settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds
    pub token_expiry: i64,
}

/// Moderation pipeline tuning
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Seconds between queue polls
    pub poll_interval_secs: u64,
    /// Records claimed per poll
    pub batch_size: usize,
    /// Name this worker claims records under within the consumer group
    pub consumer_name: String,
    /// Denylist phrases appended to the built-in list, comma separated
    pub extra_denylist: Vec<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 1,
            batch_size: 5,
            consumer_name: "worker-1".to_string(),
            extra_denylist: Vec::new(),
        }
    }
}

impl ModerationConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval_secs: parsed_or(
                "MODERATION_POLL_INTERVAL_SECS",
                defaults.poll_interval_secs,
            ),
            batch_size: parsed_or("MODERATION_BATCH_SIZE", defaults.batch_size),
            consumer_name: env::var("MODERATION_CONSUMER_NAME")
                .unwrap_or(defaults.consumer_name),
            extra_denylist: env::var("MODERATION_EXTRA_DENYLIST")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Development".parse::<Environment>().unwrap(), Environment::Development);
        assert!("lab".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_predicates() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Development.is_development());
    }

    #[test]
    fn test_server_address() {
        let server = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 9100,
        };
        assert_eq!(server.address(), "0.0.0.0:9100");
    }

    #[test]
    fn test_moderation_defaults() {
        let moderation = ModerationConfig::default();
        assert_eq!(moderation.poll_interval_secs, 1);
        assert_eq!(moderation.batch_size, 5);
        assert_eq!(moderation.consumer_name, "worker-1");
        assert!(moderation.extra_denylist.is_empty());
    }

    #[test]
    fn test_parsed_or_falls_back() {
        assert_eq!(parsed_or("NO_SUCH_VAR_FOR_SURE", 7_u32), 7);
    }
}
