//! Repository traits (ports)

mod repositories;

pub use repositories::{RecipeRepository, RecipeStepRepository, RepoResult, UserRepository};
