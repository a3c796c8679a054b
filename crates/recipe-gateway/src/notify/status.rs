//! User status listener that broadcasts presence transitions
//!
//! Registered with the presence manager at wiring time so the connection
//! handler never depends on the router directly.

use crate::notify::NotificationRouter;
use crate::presence::UserStatusListener;
use async_trait::async_trait;
use std::sync::Arc;

/// Broadcasts user online/offline transitions to everyone online
pub struct BroadcastStatusListener {
    router: Arc<NotificationRouter>,
}

impl BroadcastStatusListener {
    pub fn new(router: Arc<NotificationRouter>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl UserStatusListener for BroadcastStatusListener {
    async fn on_user_online(&self, user_id: i64, nickname: Option<&str>) {
        self.router.broadcast_user_online(user_id, nickname).await;
    }

    async fn on_user_offline(&self, user_id: i64) {
        self.router.broadcast_user_offline(user_id).await;
    }
}
