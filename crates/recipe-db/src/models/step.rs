//! Recipe step database model

use recipe_core::RecipeStep;
use sqlx::FromRow;

/// Database model for the recipe_step table
#[derive(Debug, Clone, FromRow)]
pub struct RecipeStepModel {
    pub id: i64,
    pub recipe_id: i64,
    pub step_order: i32,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl From<RecipeStepModel> for RecipeStep {
    fn from(model: RecipeStepModel) -> Self {
        Self {
            id: model.id,
            recipe_id: model.recipe_id,
            step_order: model.step_order,
            description: model.description,
            image: model.image,
        }
    }
}
