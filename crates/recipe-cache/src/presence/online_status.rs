//! User online status in Redis.
//!
//! Each reachable user has a liveness key refreshed by heartbeats and bounded
//! by a TTL, plus membership in a shared online-id set. The set is a hint:
//! reads double-check the liveness key and prune members whose key expired.

use crate::pool::{RedisPool, RedisResult};
use redis::AsyncCommands;
use std::collections::HashSet;

/// Key prefix for per-user liveness records
const SESSION_PREFIX: &str = "recipe:session:";
/// Shared set of currently-known online user ids
const ONLINE_SET_KEY: &str = "recipe:online:users";

/// Liveness TTL between heartbeats (clients ping every 60 seconds)
const HEARTBEAT_TTL: u64 = 120;

/// User online status store, shared across process instances
#[derive(Clone)]
pub struct OnlineStatusStore {
    pool: RedisPool,
}

impl OnlineStatusStore {
    /// Create a new online status store
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Generate Redis key for a user's liveness record
    fn session_key(user_id: i64) -> String {
        format!("{SESSION_PREFIX}{user_id}")
    }

    /// Record a heartbeat, refreshing the liveness TTL
    ///
    /// Idempotent: repeated calls simply extend the TTL.
    pub async fn heartbeat(&self, user_id: i64) -> RedisResult<()> {
        let key = Self::session_key(user_id);
        let now = chrono::Utc::now().timestamp_millis();
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(&key, now, HEARTBEAT_TTL).await?;
        conn.sadd::<_, _, ()>(ONLINE_SET_KEY, user_id).await?;
        Ok(())
    }

    /// Mark a user offline, removing the liveness record and set membership
    pub async fn offline(&self, user_id: i64) -> RedisResult<()> {
        let key = Self::session_key(user_id);
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(&key).await?;
        conn.srem::<_, _, ()>(ONLINE_SET_KEY, user_id).await?;
        Ok(())
    }

    /// Check whether a user's liveness record is still alive
    ///
    /// Checks the TTL-bounded record, not the online set, which may lag.
    pub async fn is_online(&self, user_id: i64) -> RedisResult<bool> {
        self.pool.key_exists(&Self::session_key(user_id)).await
    }

    /// All user ids currently online
    ///
    /// Double-checks each set member against its liveness record and
    /// opportunistically removes members whose record has expired.
    pub async fn online_ids(&self) -> RedisResult<HashSet<i64>> {
        let mut conn = self.pool.get().await?;
        let members: Vec<i64> = conn.smembers(ONLINE_SET_KEY).await?;

        let mut result = HashSet::new();
        for user_id in members {
            let alive: bool = conn.exists(Self::session_key(user_id)).await?;
            if alive {
                result.insert(user_id);
            } else {
                conn.srem::<_, _, ()>(ONLINE_SET_KEY, user_id).await?;
            }
        }
        Ok(result)
    }
}

impl std::fmt::Debug for OnlineStatusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnlineStatusStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        assert_eq!(
            OnlineStatusStore::session_key(12345),
            "recipe:session:12345"
        );
    }
}
