//! Push message format
//!
//! Defines the typed envelope delivered to connected clients. Envelopes are
//! built once, stamped with a timestamp at the delivery boundary, and
//! serialized only there - nothing in this subsystem persists them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Push message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // === System messages ===
    /// Handshake succeeded
    Connected,
    /// Liveness ping/pong
    Heartbeat,
    /// Session terminated by the server
    ForcedLogout,

    // === Moderation pipeline ===
    /// Submission passed automated pre-screening, now awaiting review
    RecipeSubmitted,
    /// Recipe approved by a moderator
    RecipeApproved,
    /// Recipe rejected (by a moderator or by pre-screening)
    RecipeRejected,
    /// New recipe awaiting review (moderator-facing)
    NewRecipePending,
    /// Author withdrew a recipe (moderator-facing)
    RecipeWithdrawn,

    // === Social ===
    /// New direct message
    NewMessage,
    /// New follower
    NewFollower,
    /// New comment on an owned recipe
    NewComment,
    /// Reply to an owned comment
    CommentReply,
    /// Like on an owned comment
    CommentLiked,

    // === Presence broadcasts ===
    UserOnline,
    UserOffline,
}

/// Envelope delivered over a live connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type
    #[serde(rename = "type")]
    pub kind: MessageType,

    /// Short human-readable title
    pub title: String,

    /// Message body
    pub content: String,

    /// Related business id (recipe id, message id, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<i64>,

    /// Acting user's id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<i64>,

    /// Acting user's display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,

    /// Acting user's avatar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_avatar: Option<String>,

    /// Attached image (recipe cover, comment image, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Stamped at delivery if the builder left it unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Envelope {
    /// Create an envelope with the required fields
    #[must_use]
    pub fn new(kind: MessageType, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            content: content.into(),
            related_id: None,
            sender_id: None,
            sender_name: None,
            sender_avatar: None,
            image_url: None,
            timestamp: None,
        }
    }

    /// Attach the related business id
    #[must_use]
    pub fn with_related(mut self, related_id: i64) -> Self {
        self.related_id = Some(related_id);
        self
    }

    /// Attach the acting user
    #[must_use]
    pub fn with_sender(
        mut self,
        sender_id: i64,
        sender_name: impl Into<String>,
        sender_avatar: Option<String>,
    ) -> Self {
        self.sender_id = Some(sender_id);
        self.sender_name = Some(sender_name.into());
        self.sender_avatar = sender_avatar;
        self
    }

    /// Attach an image
    #[must_use]
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Stamp with the current time
    #[must_use]
    pub fn stamped_now(mut self) -> Self {
        self.timestamp = Some(Utc::now());
        self
    }

    /// Ensure a timestamp is present, defaulting to now
    pub fn ensure_timestamp(&mut self) {
        if self.timestamp.is_none() {
            self.timestamp = Some(Utc::now());
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_builder() {
        let envelope = Envelope::new(MessageType::NewComment, "New comment", "Ana commented")
            .with_related(42)
            .with_sender(7, "Ana", Some("/avatars/7.png".to_string()));

        assert_eq!(envelope.kind, MessageType::NewComment);
        assert_eq!(envelope.related_id, Some(42));
        assert_eq!(envelope.sender_id, Some(7));
        assert_eq!(envelope.sender_name.as_deref(), Some("Ana"));
        assert!(envelope.timestamp.is_none());
    }

    #[test]
    fn test_ensure_timestamp_keeps_existing() {
        let mut envelope =
            Envelope::new(MessageType::Connected, "Connected", "Welcome").stamped_now();
        let stamped = envelope.timestamp;

        envelope.ensure_timestamp();
        assert_eq!(envelope.timestamp, stamped);
    }

    #[test]
    fn test_serde_shape() {
        let envelope = Envelope::new(MessageType::RecipeApproved, "Approved", "Your recipe passed")
            .with_related(42);
        let json = envelope.to_json().unwrap();

        assert!(json.contains("\"type\":\"RECIPE_APPROVED\""));
        assert!(json.contains("\"related_id\":42"));
        // Unset optional fields stay off the wire
        assert!(!json.contains("sender_id"));
        assert!(!json.contains("timestamp"));
    }

    #[test]
    fn test_roundtrip() {
        let envelope = Envelope::new(MessageType::NewFollower, "New follower", "Bo follows you")
            .with_sender(3, "Bo", None)
            .stamped_now();

        let parsed = Envelope::from_json(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(parsed, envelope);
    }
}
