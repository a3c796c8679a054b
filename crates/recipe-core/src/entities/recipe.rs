//! Recipe entity and its lifecycle states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recipe lifecycle state
///
/// Stored as a small integer column. Only the moderation consumer moves a
/// recipe out of `Processing`; moderators move it between `Pending`,
/// `Published`, and `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeStatus {
    /// Waiting for moderator review
    Pending,
    /// Visible to everyone
    Published,
    /// Rejected by a moderator
    Rejected,
    /// Author-side draft (also the destination for failed pre-screening)
    Draft,
    /// Queued for automated pre-screening
    Processing,
}

impl RecipeStatus {
    /// Database column value for this status
    #[must_use]
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Published => 1,
            Self::Rejected => 2,
            Self::Draft => 3,
            Self::Processing => 4,
        }
    }

    /// Parse a database column value
    #[must_use]
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Pending),
            1 => Some(Self::Published),
            2 => Some(Self::Rejected),
            3 => Some(Self::Draft),
            4 => Some(Self::Processing),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecipeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Published => "published",
            Self::Rejected => "rejected",
            Self::Draft => "draft",
            Self::Processing => "processing",
        };
        write!(f, "{s}")
    }
}

/// Recipe entity
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub cover_image: Option<String>,
    pub status: RecipeStatus,
    pub reject_reason: Option<String>,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Create a new recipe in the `Processing` state, as the publish flow does
    pub fn new(id: i64, user_id: i64, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            title,
            description: None,
            category_id: None,
            cover_image: None,
            status: RecipeStatus::Processing,
            reject_reason: None,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the recipe is waiting for automated pre-screening
    #[inline]
    pub fn is_processing(&self) -> bool {
        self.status == RecipeStatus::Processing
    }

    /// Move the recipe into moderator review
    pub fn mark_pending(&mut self) {
        self.status = RecipeStatus::Pending;
        self.updated_at = Utc::now();
    }

    /// Return the recipe to the author's drafts with a rejection reason
    pub fn return_to_draft(&mut self, reason: String) {
        self.status = RecipeStatus::Draft;
        self.reject_reason = Some(reason);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            RecipeStatus::Pending,
            RecipeStatus::Published,
            RecipeStatus::Rejected,
            RecipeStatus::Draft,
            RecipeStatus::Processing,
        ] {
            assert_eq!(RecipeStatus::from_i16(status.as_i16()), Some(status));
        }
        assert_eq!(RecipeStatus::from_i16(99), None);
    }

    #[test]
    fn test_mark_pending() {
        let mut recipe = Recipe::new(1, 7, "Braised pork".to_string());
        assert!(recipe.is_processing());

        recipe.mark_pending();
        assert_eq!(recipe.status, RecipeStatus::Pending);
        assert!(recipe.reject_reason.is_none());
    }

    #[test]
    fn test_return_to_draft() {
        let mut recipe = Recipe::new(1, 7, "Braised pork".to_string());
        recipe.return_to_draft("title contains a link".to_string());

        assert_eq!(recipe.status, RecipeStatus::Draft);
        assert_eq!(
            recipe.reject_reason.as_deref(),
            Some("title contains a link")
        );
        assert!(!recipe.is_processing());
    }
}
