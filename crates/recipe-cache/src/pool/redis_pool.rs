//! Deadpool-managed Redis connections.
//!
//! Every store in this crate borrows connections from one shared pool; the
//! pool itself is cheap to clone and handed out by the composition root.

use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;

/// Pool sizing and endpoint settings
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Connection URL, `redis://host:port`
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&recipe_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &recipe_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Errors surfaced by the cache layer
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Redis pool setup failed: {0}")]
    Setup(String),

    #[error("No Redis connection available: {0}")]
    Acquire(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("Cached value could not be (de)serialized: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Result alias used throughout the cache layer
pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Cloneable handle on the shared Redis pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl RedisPool {
    /// Build a pool; connections are opened lazily on first use
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::Setup(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Setup(e.to_string()))?;

        // Keep credentials out of the log line
        let endpoint = config.url.split('@').next_back().unwrap_or(&config.url);
        tracing::info!(
            endpoint,
            max_connections = config.max_connections,
            "Redis pool ready"
        );

        Ok(Self { pool })
    }

    /// Build a pool from the application configuration
    pub fn from_config(config: &recipe_common::RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    /// Borrow a connection from the pool
    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// Round-trip a PING to verify the backend is reachable
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Store a value as JSON, optionally bounded by a TTL in seconds
    pub async fn put_json<V: serde::Serialize>(
        &self,
        key: &str,
        value: &V,
        ttl_seconds: Option<u64>,
    ) -> RedisResult<()> {
        let body = serde_json::to_string(value)?;
        let mut conn = self.get().await?;

        if let Some(ttl) = ttl_seconds {
            conn.set_ex::<_, _, ()>(key, body, ttl).await?;
        } else {
            conn.set::<_, _, ()>(key, body).await?;
        }
        Ok(())
    }

    /// Load and decode a JSON value; `None` when the key is absent
    pub async fn get_json<V: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> RedisResult<Option<V>> {
        let mut conn = self.get().await?;
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|v| serde_json::from_str(&v)).transpose().map_err(Into::into)
    }

    /// Delete a key, reporting whether it existed
    pub async fn remove(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.get().await?;
        let removed: i32 = conn.del(key).await?;
        Ok(removed > 0)
    }

    /// Check for a key's existence
    pub async fn key_exists(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.get().await?;
        Ok(conn.exists(key).await?)
    }
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RedisPoolConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
        assert_eq!(config.max_connections, 16);
    }

    #[test]
    fn test_config_from_app_config() {
        let app = recipe_common::RedisConfig {
            url: "redis://cache.internal:6379".to_string(),
            max_connections: 24,
        };
        let pool = RedisPoolConfig::from(&app);
        assert_eq!(pool.url, "redis://cache.internal:6379");
        assert_eq!(pool.max_connections, 24);
    }

    #[test]
    fn test_lazy_pool_construction_needs_no_backend() {
        assert!(RedisPool::new(RedisPoolConfig::default()).is_ok());
    }
}
