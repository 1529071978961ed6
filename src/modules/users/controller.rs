use axum::{Json, extract::State};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::MessageResponse;
use crate::modules::users::model::{UpdateProfileDto, UserInfo};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserInfo),
        (status = 401, description = "Missing or invalid access token", body = MessageResponse),
        (status = 404, description = "Account no longer exists", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserInfo>, AppError> {
    let user = UserService::find_by_id(&state.db, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

    Ok(Json(user.into()))
}

/// Update the authenticated user's profile
#[utoipa::path(
    patch,
    path = "/api/users/profile",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Updated profile", body = UserInfo),
        (status = 401, description = "Missing or invalid access token", body = MessageResponse),
        (status = 409, description = "Username or email already in use", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<UserInfo>, AppError> {
    let user = UserService::update_profile(&state.db, auth_user.user_id, dto).await?;

    Ok(Json(user.into()))
}
