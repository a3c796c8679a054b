//! PostgreSQL repository implementations

mod error;
mod recipe;
mod step;
mod user;

pub use recipe::PgRecipeRepository;
pub use step::PgRecipeStepRepository;
pub use user::PgUserRepository;
