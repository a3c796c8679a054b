//! User entity - the slice of the account model this subsystem needs

use serde::{Deserialize, Serialize};

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular member
    User,
    /// Full administrator
    Admin,
    /// Moderator with audit rights but no user management
    CommonAdmin,
}

impl UserRole {
    /// Roles that receive moderation broadcasts
    #[must_use]
    pub fn is_moderator(self) -> bool {
        matches!(self, Self::Admin | Self::CommonAdmin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::CommonAdmin => "common_admin",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "common_admin" => Ok(Self::CommonAdmin),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

/// Account standing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Banned,
}

impl UserStatus {
    /// Database column value (0 = active, 1 = banned)
    #[must_use]
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Active => 0,
            Self::Banned => 1,
        }
    }

    #[must_use]
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Active),
            1 => Some(Self::Banned),
            _ => None,
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
}

impl User {
    pub fn new(id: i64, username: String, role: UserRole) -> Self {
        Self {
            id,
            username,
            nickname: None,
            avatar: None,
            role,
            status: UserStatus::Active,
        }
    }

    /// Name shown in notifications: nickname, falling back to username
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}
