//! Recipe step entity

/// A single preparation step of a recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeStep {
    pub id: i64,
    pub recipe_id: i64,
    /// 1-based position within the recipe
    pub step_order: i32,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl RecipeStep {
    pub fn new(id: i64, recipe_id: i64, step_order: i32, description: Option<String>) -> Self {
        Self {
            id,
            recipe_id,
            step_order,
            description,
            image: None,
        }
    }
}
