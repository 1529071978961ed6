//! User entity and profile DTOs.
//!
//! [`User`] mirrors the `users` row and is the record every auth flow reads
//! and writes. [`UserInfo`] is the only shape that leaves the server; the
//! password hash never does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A marketplace account.
///
/// `password` is always a bcrypt hash. Accounts created through federated
/// sign-in store a hashed random throwaway, so the column is never null and
/// password sign-in simply fails for them unless the user later sets one via
/// recovery.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    /// False until the mailed verification link is confirmed. Federated
    /// accounts are born verified.
    pub verified: bool,
    /// True for accounts created from an external identity assertion.
    pub federated: bool,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a new account row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub verified: bool,
    pub federated: bool,
    pub photo_url: Option<String>,
}

/// Client-facing profile: [`User`] minus the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub verified: bool,
    pub federated: bool,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            verified: user.verified,
            federated: user.federated,
            photo_url: user.photo_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Partial profile update. Absent fields are left untouched; a present
/// password is re-hashed before it reaches the store.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 3, max = 30))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            verified: true,
            federated: false,
            photo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn user_info_strips_password_hash() {
        let user = sample_user();
        let info: UserInfo = user.clone().into();

        let serialized = serde_json::to_string(&info).unwrap();
        assert!(serialized.contains("alice@example.com"));
        assert!(!serialized.contains("password"));
        assert!(!serialized.contains("$2b$"));
        assert_eq!(info.id, user.id);
    }

    #[test]
    fn update_profile_dto_validation() {
        use validator::Validate;

        let dto = UpdateProfileDto {
            username: Some("alice".to_string()),
            email: None,
            password: None,
            photo_url: None,
        };
        assert!(dto.validate().is_ok());

        let dto_short_name = UpdateProfileDto {
            username: Some("al".to_string()),
            email: None,
            password: None,
            photo_url: None,
        };
        assert!(dto_short_name.validate().is_err());

        let dto_short_password = UpdateProfileDto {
            username: None,
            email: None,
            password: Some("short".to_string()),
            photo_url: None,
        };
        assert!(dto_short_password.validate().is_err());
    }
}
