//! Recipe database model

use chrono::{DateTime, Utc};
use recipe_core::{DomainError, Recipe, RecipeStatus};
use sqlx::FromRow;

/// Database model for the recipe_info table
#[derive(Debug, Clone, FromRow)]
pub struct RecipeModel {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub cover_image: Option<String>,
    pub status: i16,
    pub reject_reason: Option<String>,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RecipeModel> for Recipe {
    type Error = DomainError;

    fn try_from(model: RecipeModel) -> Result<Self, Self::Error> {
        let status =
            RecipeStatus::from_i16(model.status).ok_or(DomainError::InvalidStatus(model.status))?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            category_id: model.category_id,
            cover_image: model.cover_image,
            status,
            reject_reason: model.reject_reason,
            view_count: model.view_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(status: i16) -> RecipeModel {
        RecipeModel {
            id: 42,
            user_id: 7,
            title: "Mapo tofu".to_string(),
            description: None,
            category_id: None,
            cover_image: None,
            status,
            reject_reason: None,
            view_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_conversion() {
        let recipe = Recipe::try_from(model(4)).unwrap();
        assert_eq!(recipe.status, RecipeStatus::Processing);
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(matches!(
            Recipe::try_from(model(42)),
            Err(DomainError::InvalidStatus(42))
        ));
    }
}
