//! Presence coordination
//!
//! Bridges the shared TTL-backed online store with this process's session
//! registry, and fans user online/offline transitions out to registered
//! listeners. Listeners are resolved at process wiring time, which keeps
//! the gateway free of dependencies on the subsystems reacting to presence.

use crate::connection::SessionRegistry;
use async_trait::async_trait;
use parking_lot::RwLock;
use recipe_cache::{OnlineStatusStore, RedisResult};
use std::collections::HashSet;
use std::sync::Arc;

/// Observer of user online/offline transitions
#[async_trait]
pub trait UserStatusListener: Send + Sync {
    /// Called when a user's first connection comes up
    async fn on_user_online(&self, user_id: i64, nickname: Option<&str>);

    /// Called when a user's last connection goes away
    async fn on_user_offline(&self, user_id: i64);
}

/// Presence manager
pub struct PresenceManager {
    store: OnlineStatusStore,
    registry: Arc<SessionRegistry>,
    listeners: RwLock<Vec<Arc<dyn UserStatusListener>>>,
}

impl PresenceManager {
    /// Create a new presence manager
    pub fn new(store: OnlineStatusStore, registry: Arc<SessionRegistry>) -> Self {
        Self {
            store,
            registry,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register a status listener (composition-root wiring)
    pub fn add_listener(&self, listener: Arc<dyn UserStatusListener>) {
        self.listeners.write().push(listener);
    }

    /// Refresh a user's liveness record
    pub async fn heartbeat(&self, user_id: i64) -> RedisResult<()> {
        self.store.heartbeat(user_id).await
    }

    /// Mark a user offline in the shared store
    pub async fn offline(&self, user_id: i64) -> RedisResult<()> {
        self.store.offline(user_id).await
    }

    /// Check the user's TTL-bounded liveness record
    pub async fn is_online(&self, user_id: i64) -> RedisResult<bool> {
        self.store.is_online(user_id).await
    }

    /// All user ids currently online across processes
    pub async fn online_ids(&self) -> RedisResult<HashSet<i64>> {
        self.store.online_ids().await
    }

    /// Terminate a user's session: close the live connection (with a
    /// forced-logout notice) and clear the presence record.
    ///
    /// Used for admin-initiated termination and for resolving
    /// already-logged-in-elsewhere conflicts.
    pub async fn kick(&self, user_id: i64, reason: &str) -> RedisResult<()> {
        self.registry.close_user(user_id, reason);
        self.store.offline(user_id).await?;
        tracing::info!(user_id, "User kicked");
        Ok(())
    }

    /// Notify listeners that a user came online
    pub async fn notify_online(&self, user_id: i64, nickname: Option<&str>) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.on_user_online(user_id, nickname).await;
        }
    }

    /// Notify listeners that a user went offline
    pub async fn notify_offline(&self, user_id: i64) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.on_user_offline(user_id).await;
        }
    }
}

impl std::fmt::Debug for PresenceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceManager")
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_cache::{RedisPool, RedisPoolConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener {
        online: AtomicUsize,
        offline: AtomicUsize,
    }

    #[async_trait]
    impl UserStatusListener for CountingListener {
        async fn on_user_online(&self, _user_id: i64, _nickname: Option<&str>) {
            self.online.fetch_add(1, Ordering::SeqCst);
        }

        async fn on_user_offline(&self, _user_id: i64) {
            self.offline.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn manager() -> PresenceManager {
        // Pool construction is lazy; no Redis needed for listener wiring
        let pool = RedisPool::new(RedisPoolConfig::default()).unwrap();
        PresenceManager::new(OnlineStatusStore::new(pool), SessionRegistry::new_shared())
    }

    #[tokio::test]
    async fn test_listeners_fire() {
        let manager = manager();
        let listener = Arc::new(CountingListener {
            online: AtomicUsize::new(0),
            offline: AtomicUsize::new(0),
        });
        manager.add_listener(listener.clone());

        manager.notify_online(7, Some("The Cook")).await;
        manager.notify_online(8, None).await;
        manager.notify_offline(7).await;

        assert_eq!(listener.online.load(Ordering::SeqCst), 2);
        assert_eq!(listener.offline.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_listeners_is_fine() {
        let manager = manager();
        manager.notify_online(7, None).await;
        manager.notify_offline(7).await;
    }

    #[tokio::test]
    async fn test_kick_closes_live_connection() {
        use crate::connection::{Connection, Outbound};
        use crate::protocol::MessageType;
        use tokio::sync::mpsc;

        let pool = RedisPool::new(RedisPoolConfig::default()).unwrap();
        let registry = SessionRegistry::new_shared();
        let manager = PresenceManager::new(OnlineStatusStore::new(pool), registry.clone());

        let (tx, mut rx) = mpsc::channel(10);
        registry.register(Connection::new(7, tx));

        // The store half may fail without a live cache; the connection half
        // must converge regardless
        let _ = manager.kick(7, "Terminated by an administrator").await;

        assert!(!registry.is_online(7));
        match rx.recv().await {
            Some(Outbound::Envelope(e)) => assert_eq!(e.kind, MessageType::ForcedLogout),
            other => panic!("expected forced-logout envelope, got {other:?}"),
        }
        assert!(matches!(rx.recv().await, Some(Outbound::Close)));
    }
}
