use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::Claim;

/// The authenticated principal.
///
/// Validates the bearer token against the access codec and accepts only
/// access claims: a refresh, verification, or recovery token presented here
/// is rejected regardless of its own validity. Downstream modules (profile
/// today, property listings et al. tomorrow) consume identity through this
/// extractor and never touch tokens themselves.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::unauthorized(anyhow::anyhow!("Missing authorization header"))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized(anyhow::anyhow!("Invalid authorization header format"))
        })?;

        match state.tokens.verify(token) {
            Ok(Claim::Access { user_id }) => Ok(AuthUser { user_id }),
            Ok(_) => Err(AppError::unauthorized(anyhow::anyhow!(
                "Access token required"
            ))),
            Err(_) => Err(AppError::unauthorized(anyhow::anyhow!(
                "Invalid or expired token"
            ))),
        }
    }
}
