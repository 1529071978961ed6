//! Credential store: the single owner of the `users` table.
//!
//! Every operation touches exactly one row. Uniqueness of `email` and
//! `username` is enforced by the table constraints, so concurrent writers
//! that pass a pre-check still collide here and surface the same 409.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::users::model::{NewUser, UpdateProfileDto, User};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

const USER_COLUMNS: &str =
    "id, username, email, password, verified, federated, photo_url, created_at, updated_at";

fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_username_key") => {
                    AppError::conflict(anyhow::anyhow!("Username is already taken"))
                }
                _ => AppError::conflict(anyhow::anyhow!("Email is already registered")),
            };
        }
    }
    AppError::database(err)
}

pub struct UserService;

impl UserService {
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?;

        Ok(user)
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?;

        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?;

        Ok(user)
    }

    /// Inserts a new account. A lost race against a concurrent insert with the
    /// same email or username surfaces as the same 409 the pre-checks produce.
    #[instrument(skip_all, fields(email = %new_user.email))]
    pub async fn create(db: &PgPool, new_user: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password, verified, federated, photo_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.verified)
        .bind(new_user.federated)
        .bind(&new_user.photo_url)
        .fetch_one(db)
        .await
        .map_err(map_unique_violation)?;

        Ok(user)
    }

    /// Replaces the stored hash for the account identified by `email`.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn update_password(
        db: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET password = $2, updated_at = NOW()
             WHERE email = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("No account found for that email")))?;

        Ok(user)
    }

    /// Applies a partial profile update; absent fields keep their value.
    #[instrument(skip_all, fields(user_id = %id))]
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<User, AppError> {
        let password_hash = dto.password.as_deref().map(hash_password).transpose()?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                 username = COALESCE($2, username),
                 email = COALESCE($3, email),
                 password = COALESCE($4, password),
                 photo_url = COALESCE($5, photo_url),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(&dto.photo_url)
        .fetch_optional(db)
        .await
        .map_err(map_unique_violation)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        Ok(user)
    }
}
