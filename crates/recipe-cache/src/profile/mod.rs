//! Cached user profile data

mod user_profile;

pub use user_profile::{UserProfile, UserProfileCache};
