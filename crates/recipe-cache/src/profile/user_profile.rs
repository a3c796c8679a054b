//! Read-through cache of user display data.
//!
//! Callers check the cache first and fall back to the user repository on a
//! miss, writing the loaded profile back with a bounded TTL. Profile edits
//! invalidate the entry so the next read refreshes it.

use crate::pool::{RedisPool, RedisResult};
use recipe_core::User;
use serde::{Deserialize, Serialize};

/// Key prefix for cached profiles
const PROFILE_PREFIX: &str = "recipe:user:info:";
/// Profile TTL (30 minutes)
const PROFILE_TTL: u64 = 1800;

/// Display slice of a user account, safe to cache and send in envelopes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.display_name().to_string(),
            avatar: user.avatar.clone(),
        }
    }
}

/// User profile cache store
#[derive(Clone)]
pub struct UserProfileCache {
    pool: RedisPool,
}

impl UserProfileCache {
    /// Create a new profile cache
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn profile_key(user_id: i64) -> String {
        format!("{PROFILE_PREFIX}{user_id}")
    }

    /// Get a cached profile
    pub async fn get(&self, user_id: i64) -> RedisResult<Option<UserProfile>> {
        self.pool.get_json(&Self::profile_key(user_id)).await
    }

    /// Store a profile with the standard TTL
    pub async fn put(&self, profile: &UserProfile) -> RedisResult<()> {
        self.pool
            .put_json(&Self::profile_key(profile.id), profile, Some(PROFILE_TTL))
            .await?;

        tracing::debug!(user_id = profile.id, "Cached user profile");
        Ok(())
    }

    /// Drop a cached profile (called when the account is edited)
    pub async fn invalidate(&self, user_id: i64) -> RedisResult<bool> {
        self.pool.remove(&Self::profile_key(user_id)).await
    }
}

impl std::fmt::Debug for UserProfileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserProfileCache").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_core::UserRole;

    #[test]
    fn test_profile_from_user() {
        let mut user = User::new(7, "cook42".to_string(), UserRole::User);
        user.nickname = Some("The Cook".to_string());
        user.avatar = Some("/avatars/7.png".to_string());

        let profile = UserProfile::from(&user);
        assert_eq!(profile.id, 7);
        assert_eq!(profile.name, "The Cook");
        assert_eq!(profile.avatar.as_deref(), Some("/avatars/7.png"));
    }

    #[test]
    fn test_key_generation() {
        assert_eq!(UserProfileCache::profile_key(7), "recipe:user:info:7");
    }
}
