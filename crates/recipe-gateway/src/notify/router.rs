//! Notification router
//!
//! Builds typed envelopes for each domain event and delivers them through
//! the session registry. Delivery is best-effort: a recipient without a
//! live connection or a failed write is logged and swallowed, never
//! surfaced to the business operation that triggered the notification.

use crate::connection::SessionRegistry;
use crate::protocol::{Envelope, MessageType};
use recipe_cache::OnlineStatusStore;
use recipe_core::UserRepository;
use std::sync::Arc;

/// Preview length for message bodies and comment replies
const PREVIEW_LONG: usize = 50;
/// Preview length for quoted comment content
const PREVIEW_SHORT: usize = 30;

/// Truncate text to a preview of at most `max` characters
fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut s: String = text.chars().take(max).collect();
    s.push_str("...");
    s
}

/// Routes notifications to connected users
pub struct NotificationRouter {
    registry: Arc<SessionRegistry>,
    users: Arc<dyn UserRepository>,
    online: OnlineStatusStore,
}

impl NotificationRouter {
    /// Create a new router
    pub fn new(
        registry: Arc<SessionRegistry>,
        users: Arc<dyn UserRepository>,
        online: OnlineStatusStore,
    ) -> Self {
        Self {
            registry,
            users,
            online,
        }
    }

    /// Deliver an envelope to one user, stamping a missing timestamp.
    ///
    /// Returns `false` when the user is unreachable; callers must not treat
    /// that as an error.
    pub fn send_to_user(&self, user_id: i64, mut envelope: Envelope) -> bool {
        envelope.ensure_timestamp();

        let delivered = self.registry.send(user_id, &envelope);
        if delivered {
            tracing::info!(user_id, kind = ?envelope.kind, "Notification delivered");
        } else {
            tracing::info!(user_id, kind = ?envelope.kind, "User offline, notification skipped");
        }
        delivered
    }

    /// Author-facing: submission passed automated checks, awaiting review
    pub fn recipe_submitted(&self, author_id: i64, recipe_id: i64, recipe_title: &str) {
        let envelope = Envelope::new(
            MessageType::RecipeSubmitted,
            "Recipe submitted 🎉",
            format!("Your recipe \"{recipe_title}\" passed automated checks and is awaiting review"),
        )
        .with_related(recipe_id);
        self.send_to_user(author_id, envelope);
    }

    /// Author-facing: recipe approved by a moderator
    pub fn recipe_approved(&self, author_id: i64, recipe_id: i64, recipe_title: &str) {
        let envelope = Envelope::new(
            MessageType::RecipeApproved,
            "Recipe approved 🎉",
            format!("Your recipe \"{recipe_title}\" has been approved, go take a look!"),
        )
        .with_related(recipe_id);
        self.send_to_user(author_id, envelope);
    }

    /// Author-facing: recipe rejected, with the reason when known
    pub fn recipe_rejected(
        &self,
        author_id: i64,
        recipe_id: i64,
        recipe_title: &str,
        reason: Option<&str>,
    ) {
        let mut content = format!("Your recipe \"{recipe_title}\" was not approved");
        if let Some(reason) = reason.filter(|r| !r.is_empty()) {
            content.push_str(&format!(", reason: {reason}"));
        }

        let envelope = Envelope::new(MessageType::RecipeRejected, "Recipe rejected", content)
            .with_related(recipe_id);
        self.send_to_user(author_id, envelope);
    }

    /// New direct message, body truncated to a preview
    pub fn new_message(
        &self,
        receiver_id: i64,
        sender_id: i64,
        sender_name: &str,
        sender_avatar: Option<String>,
        content: &str,
    ) {
        let envelope = Envelope::new(
            MessageType::NewMessage,
            "New message",
            preview(content, PREVIEW_LONG),
        )
        .with_sender(sender_id, sender_name, sender_avatar);
        self.send_to_user(receiver_id, envelope);
    }

    /// New follower
    pub fn new_follower(
        &self,
        followed_id: i64,
        follower_id: i64,
        follower_name: &str,
        follower_avatar: Option<String>,
    ) {
        let envelope = Envelope::new(
            MessageType::NewFollower,
            "New follower",
            format!("{follower_name} followed you"),
        )
        .with_sender(follower_id, follower_name, follower_avatar);
        self.send_to_user(followed_id, envelope);
    }

    /// New comment on an owned recipe
    pub fn new_comment(
        &self,
        author_id: i64,
        commenter_id: i64,
        commenter_name: &str,
        recipe_id: i64,
        recipe_title: &str,
    ) {
        let envelope = Envelope::new(
            MessageType::NewComment,
            "New comment",
            format!("{commenter_name} commented on your recipe \"{recipe_title}\""),
        )
        .with_related(recipe_id)
        .with_sender(commenter_id, commenter_name, None);
        self.send_to_user(author_id, envelope);
    }

    /// Reply to an owned comment. Replying to yourself notifies nobody.
    pub fn comment_reply(
        &self,
        original_commenter_id: i64,
        replier_id: i64,
        replier_name: &str,
        recipe_id: i64,
        reply_content: &str,
    ) {
        if original_commenter_id == replier_id {
            return;
        }

        let envelope = Envelope::new(
            MessageType::CommentReply,
            "Comment replied",
            format!(
                "{replier_name} replied to your comment: {}",
                preview(reply_content, PREVIEW_LONG)
            ),
        )
        .with_related(recipe_id)
        .with_sender(replier_id, replier_name, None);
        self.send_to_user(original_commenter_id, envelope);
    }

    /// Like on an owned comment. Liking your own comment notifies nobody.
    pub fn comment_liked(
        &self,
        comment_owner_id: i64,
        liker_id: i64,
        liker_name: &str,
        recipe_id: i64,
        comment_content: &str,
    ) {
        if comment_owner_id == liker_id {
            return;
        }

        let envelope = Envelope::new(
            MessageType::CommentLiked,
            "Comment liked",
            format!(
                "{liker_name} liked your comment: {}",
                preview(comment_content, PREVIEW_SHORT)
            ),
        )
        .with_related(recipe_id)
        .with_sender(liker_id, liker_name, None);
        self.send_to_user(comment_owner_id, envelope);
    }

    /// Moderator-facing: a new recipe is awaiting review
    pub async fn new_recipe_pending(
        &self,
        recipe_id: i64,
        recipe_title: &str,
        author_id: i64,
        author_name: &str,
        cover_image: Option<String>,
    ) {
        let mut envelope = Envelope::new(
            MessageType::NewRecipePending,
            "New recipe awaiting review 📝",
            format!("User \"{author_name}\" submitted the recipe \"{recipe_title}\", please review it"),
        )
        .with_related(recipe_id)
        .with_sender(author_id, author_name, None);

        if let Some(cover) = cover_image {
            envelope = envelope.with_image(cover);
        }

        self.broadcast_to_admins(envelope).await;
    }

    /// Moderator-facing: an author withdrew a recipe
    pub async fn recipe_withdrawn(
        &self,
        recipe_id: i64,
        recipe_title: &str,
        author_id: i64,
        author_name: &str,
    ) {
        let envelope = Envelope::new(
            MessageType::RecipeWithdrawn,
            "Recipe withdrawn",
            format!("User \"{author_name}\" withdrew the recipe \"{recipe_title}\""),
        )
        .with_related(recipe_id)
        .with_sender(author_id, author_name, None);

        self.broadcast_to_admins(envelope).await;
    }

    /// Broadcast a user-online transition to everyone currently online
    pub async fn broadcast_user_online(&self, user_id: i64, nickname: Option<&str>) {
        let content = match nickname {
            Some(name) => format!("{name} is online"),
            None => "User is online".to_string(),
        };
        let envelope = Envelope::new(MessageType::UserOnline, "User online", content)
            .with_related(user_id)
            .stamped_now();

        self.broadcast_to_all_online(envelope).await;
        tracing::debug!(user_id, "Broadcast user online");
    }

    /// Broadcast a user-offline transition to everyone currently online
    pub async fn broadcast_user_offline(&self, user_id: i64) {
        let envelope = Envelope::new(MessageType::UserOffline, "User offline", "User went offline")
            .with_related(user_id)
            .stamped_now();

        self.broadcast_to_all_online(envelope).await;
        tracing::debug!(user_id, "Broadcast user offline");
    }

    /// Send an envelope to every active moderator.
    ///
    /// Moderator lookup failures are logged and swallowed: moderation
    /// broadcasts must never fail the triggering operation.
    pub async fn broadcast_to_admins(&self, mut envelope: Envelope) {
        let admins = match self.users.find_active_moderators().await {
            Ok(admins) => admins,
            Err(e) => {
                tracing::error!(error = %e, "Failed to look up moderators for broadcast");
                return;
            }
        };

        if admins.is_empty() {
            tracing::warn!(kind = ?envelope.kind, "No active moderators to notify");
            return;
        }

        envelope.ensure_timestamp();

        let total = admins.len();
        let mut sent = 0;
        for admin in admins {
            if self.registry.send(admin.id, &envelope) {
                sent += 1;
            }
        }

        tracing::debug!(kind = ?envelope.kind, sent, total, "Moderator broadcast finished");
    }

    /// Send an envelope to every user the presence store considers online
    pub async fn broadcast_to_all_online(&self, mut envelope: Envelope) {
        let online_ids = match self.online.online_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "Failed to enumerate online users for broadcast");
                return;
            }
        };

        if online_ids.is_empty() {
            return;
        }

        envelope.ensure_timestamp();

        let mut sent = 0;
        for user_id in online_ids {
            if self.registry.send(user_id, &envelope) {
                sent += 1;
            }
        }

        if sent > 0 {
            tracing::debug!(kind = ?envelope.kind, sent, "Online broadcast finished");
        }
    }
}

impl std::fmt::Debug for NotificationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationRouter")
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Connection, Outbound};
    use async_trait::async_trait;
    use recipe_cache::{RedisPool, RedisPoolConfig};
    use recipe_core::{RepoResult, User, UserRole};
    use tokio::sync::mpsc;

    struct FixedUsers {
        moderators: Vec<User>,
    }

    #[async_trait]
    impl UserRepository for FixedUsers {
        async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
            Ok(self.moderators.iter().find(|u| u.id == id).cloned())
        }

        async fn find_active_moderators(&self) -> RepoResult<Vec<User>> {
            Ok(self.moderators.clone())
        }
    }

    fn router_with_moderators(moderators: Vec<User>) -> (NotificationRouter, Arc<SessionRegistry>) {
        let registry = SessionRegistry::new_shared();
        let pool = RedisPool::new(RedisPoolConfig::default()).unwrap();
        let router = NotificationRouter::new(
            registry.clone(),
            Arc::new(FixedUsers { moderators }),
            OnlineStatusStore::new(pool),
        );
        (router, registry)
    }

    fn connect(registry: &SessionRegistry, user_id: i64) -> mpsc::Receiver<Outbound> {
        let (tx, rx) = mpsc::channel(10);
        registry.register(Connection::new(user_id, tx));
        rx
    }

    fn recv_envelope(rx: &mut mpsc::Receiver<Outbound>) -> Option<Envelope> {
        match rx.try_recv() {
            Ok(Outbound::Envelope(e)) => Some(e),
            _ => None,
        }
    }

    #[test]
    fn test_preview_truncation() {
        assert_eq!(preview("short", 50), "short");
        let long = "a".repeat(60);
        let p = preview(&long, 50);
        assert_eq!(p.chars().count(), 53);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_preview_multibyte_boundary() {
        let text = "香辣豆腐煲".repeat(20);
        let p = preview(&text, 30);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 33);
    }

    #[tokio::test]
    async fn test_send_to_user_stamps_timestamp() {
        let (router, registry) = router_with_moderators(vec![]);
        let mut rx = connect(&registry, 7);

        let delivered = router.send_to_user(
            7,
            Envelope::new(MessageType::NewMessage, "New message", "hello"),
        );
        assert!(delivered);

        let envelope = recv_envelope(&mut rx).unwrap();
        assert!(envelope.timestamp.is_some());
    }

    #[tokio::test]
    async fn test_send_to_offline_user_returns_false() {
        let (router, _registry) = router_with_moderators(vec![]);
        let delivered = router.send_to_user(
            99,
            Envelope::new(MessageType::NewMessage, "New message", "hello"),
        );
        assert!(!delivered);
    }

    #[tokio::test]
    async fn test_self_like_is_suppressed() {
        let (router, registry) = router_with_moderators(vec![]);
        let mut rx = connect(&registry, 7);

        router.comment_liked(7, 7, "Me", 42, "my own comment");
        assert!(recv_envelope(&mut rx).is_none());
    }

    #[tokio::test]
    async fn test_self_reply_is_suppressed() {
        let (router, registry) = router_with_moderators(vec![]);
        let mut rx = connect(&registry, 7);

        router.comment_reply(7, 7, "Me", 42, "replying to myself");
        assert!(recv_envelope(&mut rx).is_none());
    }

    #[tokio::test]
    async fn test_reply_from_other_user_delivers() {
        let (router, registry) = router_with_moderators(vec![]);
        let mut rx = connect(&registry, 7);

        router.comment_reply(7, 8, "Bo", 42, "nice recipe");
        let envelope = recv_envelope(&mut rx).unwrap();
        assert_eq!(envelope.kind, MessageType::CommentReply);
        assert_eq!(envelope.sender_id, Some(8));
        assert!(envelope.content.contains("nice recipe"));
    }

    #[tokio::test]
    async fn test_rejection_carries_reason() {
        let (router, registry) = router_with_moderators(vec![]);
        let mut rx = connect(&registry, 7);

        router.recipe_rejected(7, 42, "Mapo tofu", Some("title contains a link"));
        let envelope = recv_envelope(&mut rx).unwrap();
        assert_eq!(envelope.kind, MessageType::RecipeRejected);
        assert!(envelope.content.contains("title contains a link"));
    }

    #[tokio::test]
    async fn test_pending_broadcast_reaches_all_connected_moderators() {
        let mods = vec![
            User::new(100, "mod-a".to_string(), UserRole::Admin),
            User::new(101, "mod-b".to_string(), UserRole::CommonAdmin),
        ];
        let (router, registry) = router_with_moderators(mods);
        let mut rx_a = connect(&registry, 100);
        let mut rx_b = connect(&registry, 101);

        router
            .new_recipe_pending(42, "Mapo tofu", 7, "The Cook", Some("/covers/42.jpg".into()))
            .await;

        for rx in [&mut rx_a, &mut rx_b] {
            let envelope = recv_envelope(rx).unwrap();
            assert_eq!(envelope.kind, MessageType::NewRecipePending);
            assert_eq!(envelope.related_id, Some(42));
            assert_eq!(envelope.image_url.as_deref(), Some("/covers/42.jpg"));
        }
    }

    #[tokio::test]
    async fn test_broadcast_with_no_moderators_is_quiet() {
        let (router, _registry) = router_with_moderators(vec![]);
        // Must not panic or error
        router.new_recipe_pending(42, "Mapo tofu", 7, "The Cook", None).await;
    }

    #[tokio::test]
    async fn test_recipe_approved_delivers() {
        let (router, registry) = router_with_moderators(vec![]);
        let mut rx = connect(&registry, 7);

        router.recipe_approved(7, 42, "Mapo tofu");
        let envelope = recv_envelope(&mut rx).unwrap();
        assert_eq!(envelope.kind, MessageType::RecipeApproved);
        assert_eq!(envelope.related_id, Some(42));
        assert!(envelope.content.contains("Mapo tofu"));
    }

    #[tokio::test]
    async fn test_new_message_body_truncated() {
        let (router, registry) = router_with_moderators(vec![]);
        let mut rx = connect(&registry, 7);

        let body = "b".repeat(200);
        router.new_message(7, 8, "Bo", None, &body);

        let envelope = recv_envelope(&mut rx).unwrap();
        assert_eq!(envelope.kind, MessageType::NewMessage);
        assert_eq!(envelope.content.chars().count(), 53);
        assert!(envelope.content.ends_with("..."));
    }

    #[tokio::test]
    async fn test_new_follower_names_the_follower() {
        let (router, registry) = router_with_moderators(vec![]);
        let mut rx = connect(&registry, 7);

        router.new_follower(7, 8, "Bo", Some("/avatars/8.png".to_string()));

        let envelope = recv_envelope(&mut rx).unwrap();
        assert_eq!(envelope.kind, MessageType::NewFollower);
        assert_eq!(envelope.content, "Bo followed you");
        assert_eq!(envelope.sender_avatar.as_deref(), Some("/avatars/8.png"));
    }

    #[tokio::test]
    async fn test_new_comment_delivers_to_recipe_author() {
        let (router, registry) = router_with_moderators(vec![]);
        let mut rx = connect(&registry, 7);

        router.new_comment(7, 8, "Bo", 42, "Mapo tofu");

        let envelope = recv_envelope(&mut rx).unwrap();
        assert_eq!(envelope.kind, MessageType::NewComment);
        assert_eq!(envelope.related_id, Some(42));
        assert_eq!(envelope.sender_id, Some(8));
    }

    #[tokio::test]
    async fn test_recipe_withdrawn_reaches_moderators() {
        let mods = vec![User::new(100, "mod-a".to_string(), UserRole::Admin)];
        let (router, registry) = router_with_moderators(mods);
        let mut rx = connect(&registry, 100);

        router.recipe_withdrawn(42, "Mapo tofu", 7, "The Cook").await;

        let envelope = recv_envelope(&mut rx).unwrap();
        assert_eq!(envelope.kind, MessageType::RecipeWithdrawn);
        assert!(envelope.content.contains("The Cook"));
    }

    #[tokio::test]
    async fn test_online_broadcast_survives_missing_cache() {
        let (router, _registry) = router_with_moderators(vec![]);
        // The lazy pool has no live backend; the failure is swallowed
        router.broadcast_user_online(7, Some("The Cook")).await;
        router.broadcast_user_offline(7).await;
    }
}
