//! # recipe-cache
//!
//! Redis layer shared across process instances.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Presence**: TTL-bounded user liveness records plus a shared online set
//! - **Publish Queue**: durable Redis Stream with a competing consumer group
//!   feeding the moderation pipeline
//! - **Profile Cache**: read-through cache of user display data

pub mod pool;
pub mod presence;
pub mod profile;
pub mod queue;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export presence types
pub use presence::OnlineStatusStore;

// Re-export queue types
pub use queue::{PublishQueue, QueueRecord};

// Re-export profile types
pub use profile::{UserProfile, UserProfileCache};
