//! User database model

use recipe_core::{DomainError, User, UserRole, UserStatus};
use sqlx::FromRow;

/// Database model for the sys_user table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub role: String,
    pub status: i16,
}

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        let role = model
            .role
            .parse::<UserRole>()
            .map_err(DomainError::DatabaseError)?;
        let status =
            UserStatus::from_i16(model.status).ok_or(DomainError::InvalidStatus(model.status))?;

        Ok(Self {
            id: model.id,
            username: model.username,
            nickname: model.nickname,
            avatar: model.avatar,
            role,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        let model = UserModel {
            id: 1,
            username: "mod1".to_string(),
            nickname: Some("Moderator One".to_string()),
            avatar: None,
            role: "common_admin".to_string(),
            status: 0,
        };

        let user = User::try_from(model).unwrap();
        assert_eq!(user.role, UserRole::CommonAdmin);
        assert_eq!(user.status, UserStatus::Active);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let model = UserModel {
            id: 1,
            username: "x".to_string(),
            nickname: None,
            avatar: None,
            role: "superuser".to_string(),
            status: 0,
        };
        assert!(User::try_from(model).is_err());
    }
}
