//! Session registry
//!
//! Per-process map from user id to its single active connection, using
//! DashMap for thread-safe access. The registry owns the invariant that a
//! user never holds more than one live connection: registering a second
//! connection closes and evicts the first.

use super::{Connection, Outbound};
use crate::protocol::{Envelope, MessageType};
use dashmap::DashMap;
use std::sync::Arc;

/// Registry of active connections, one per user
pub struct SessionRegistry {
    sessions: DashMap<i64, Arc<Connection>>,
}

impl SessionRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a connection, evicting any previous connection of the user.
    ///
    /// The evicted connection is closed best-effort; a failed close is
    /// logged, never propagated.
    pub fn register(&self, connection: Arc<Connection>) {
        let user_id = connection.user_id();
        let connection_id = connection.id().to_string();

        if let Some(previous) = self.sessions.insert(user_id, connection) {
            if !previous.is_closed() && !previous.close() {
                tracing::warn!(
                    user_id,
                    connection_id = %previous.id(),
                    "Failed to close evicted connection"
                );
            }
            tracing::info!(
                user_id,
                evicted = %previous.id(),
                replacement = %connection_id,
                "Replaced existing connection"
            );
        } else {
            tracing::info!(
                user_id,
                connection_id = %connection_id,
                online = self.sessions.len(),
                "Connection registered"
            );
        }
    }

    /// Remove a connection, but only if the stored entry is the same
    /// connection being removed.
    ///
    /// A stale close callback from an evicted connection must not unregister
    /// the newer one that replaced it.
    pub fn remove(&self, user_id: i64, connection_id: &str) -> bool {
        let removed = self
            .sessions
            .remove_if(&user_id, |_, conn| conn.id() == connection_id)
            .is_some();

        if removed {
            tracing::info!(
                user_id,
                connection_id = %connection_id,
                online = self.sessions.len(),
                "Connection removed"
            );
        }
        removed
    }

    /// Check whether the user has a live connection in this process
    pub fn is_online(&self, user_id: i64) -> bool {
        self.sessions.contains_key(&user_id)
    }

    /// Deliver an envelope to a user's connection, fire-and-forget.
    ///
    /// Returns `false` if the user has no connection here or the write
    /// fails; callers must not treat `false` as an error.
    pub fn send(&self, user_id: i64, envelope: &Envelope) -> bool {
        match self.sessions.get(&user_id) {
            Some(conn) => conn.send_envelope(envelope.clone()),
            None => false,
        }
    }

    /// Number of users with a live connection in this process
    pub fn online_count(&self) -> usize {
        self.sessions.len()
    }

    /// Forcibly close a user's connection, sending a forced-logout notice
    /// first. Returns `false` if the user had no connection.
    pub fn close_user(&self, user_id: i64, reason: &str) -> bool {
        let Some((_, conn)) = self.sessions.remove(&user_id) else {
            return false;
        };

        let notice =
            Envelope::new(MessageType::ForcedLogout, "Signed out", reason).stamped_now();
        conn.send_envelope(notice);
        conn.send(Outbound::Close);

        tracing::info!(user_id, reason, "Closed user connection");
        true
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn envelope() -> Envelope {
        Envelope::new(MessageType::NewComment, "New comment", "hi")
    }

    #[tokio::test]
    async fn test_register_and_send() {
        let registry = SessionRegistry::new();
        let (tx, mut rx) = mpsc::channel(10);

        registry.register(Connection::new(7, tx));
        assert!(registry.is_online(7));
        assert_eq!(registry.online_count(), 1);

        assert!(registry.send(7, &envelope()));
        assert!(matches!(rx.recv().await, Some(Outbound::Envelope(_))));
    }

    #[tokio::test]
    async fn test_send_to_absent_user_returns_false() {
        let registry = SessionRegistry::new();
        assert!(!registry.send(99, &envelope()));
    }

    #[tokio::test]
    async fn test_second_registration_evicts_first() {
        let registry = SessionRegistry::new();
        let (tx1, mut rx1) = mpsc::channel(10);
        let (tx2, mut rx2) = mpsc::channel(10);

        registry.register(Connection::new(7, tx1));
        registry.register(Connection::new(7, tx2));

        // Invariant held throughout: exactly one live entry
        assert!(registry.is_online(7));
        assert_eq!(registry.online_count(), 1);

        // The first connection was asked to close
        assert!(matches!(rx1.recv().await, Some(Outbound::Close)));

        // Delivery lands on the replacement only
        registry.send(7, &envelope());
        assert!(matches!(rx2.recv().await, Some(Outbound::Envelope(_))));
    }

    #[tokio::test]
    async fn test_stale_remove_keeps_newer_connection() {
        let registry = SessionRegistry::new();
        let (tx1, _rx1) = mpsc::channel(10);
        let (tx2, _rx2) = mpsc::channel(10);

        let old = Connection::new(7, tx1);
        let old_id = old.id().to_string();
        registry.register(old);

        // Network flap: the same user reconnects before the old close fires
        registry.register(Connection::new(7, tx2));

        // The stale callback must not evict the replacement
        assert!(!registry.remove(7, &old_id));
        assert!(registry.is_online(7));
        assert_eq!(registry.online_count(), 1);
    }

    #[tokio::test]
    async fn test_close_user_sends_forced_logout() {
        let registry = SessionRegistry::new();
        let (tx, mut rx) = mpsc::channel(10);

        registry.register(Connection::new(7, tx));
        assert!(registry.close_user(7, "Signed in from another device"));
        assert!(!registry.is_online(7));

        match rx.recv().await {
            Some(Outbound::Envelope(e)) => {
                assert_eq!(e.kind, MessageType::ForcedLogout);
                assert!(e.timestamp.is_some());
            }
            other => panic!("expected forced-logout envelope, got {other:?}"),
        }
        assert!(matches!(rx.recv().await, Some(Outbound::Close)));
    }

    #[tokio::test]
    async fn test_close_absent_user_returns_false() {
        let registry = SessionRegistry::new();
        assert!(!registry.close_user(7, "whatever"));
    }
}
