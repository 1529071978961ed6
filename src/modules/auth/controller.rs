use axum::extract::{Query, State};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;

use crate::config::jwt::JwtConfig;
use crate::modules::users::model::User;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    ForgetPasswordRequest, GoogleSignInRequest, MessageResponse, RecoverPasswordRequest,
    SessionResponse, SigninRequest, SignupRequest, TokenQuery,
};
use super::service::{AuthService, SessionTokens};

/// Cookie carrying the refresh token. HTTP-only and same-site strict: the
/// browser presents it only to this API, and scripts never see it.
pub const REFRESH_COOKIE: &str = "refreshToken";

fn refresh_cookie(token: String, jwt_config: &JwtConfig) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/api")
        .http_only(true)
        .secure(jwt_config.secure_cookies)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(jwt_config.refresh_token_expiry))
        .build()
}

fn session_response(
    jar: CookieJar,
    state: &AppState,
    user: User,
    tokens: SessionTokens,
    message: &str,
) -> (CookieJar, Json<SessionResponse>) {
    let jar = jar.add(refresh_cookie(tokens.refresh_token, &state.jwt_config));
    (
        jar,
        Json(SessionResponse {
            success: true,
            message: message.to_string(),
            token: Some(tokens.access_token),
            user_info: Some(user.into()),
        }),
    )
}

/// Request a new account; a verification link is mailed, nothing is stored yet
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Verification email sent", body = MessageResponse),
        (status = 409, description = "Username or email already in use", body = MessageResponse),
        (status = 422, description = "Validation error", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SignupRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::signup(&state, dto).await?;
    Ok(Json(MessageResponse::new(
        "Verification email sent. Confirm your address to finish signing up.",
    )))
}

/// Confirm a mailed verification link and open a session
#[utoipa::path(
    get,
    path = "/api/auth/verify-email",
    params(TokenQuery),
    responses(
        (status = 200, description = "Account verified, session opened", body = SessionResponse),
        (status = 400, description = "Missing token", body = MessageResponse),
        (status = 401, description = "Invalid or expired verification link", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, params, jar))]
pub async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<TokenQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let token = params
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Token is required")))?;

    let (user, tokens) = AuthService::confirm_verification(&state, &token).await?;
    Ok(session_response(jar, &state, user, tokens, "Email verified"))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Invalid email or password", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto, jar))]
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<SigninRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let (user, tokens) = AuthService::signin(&state, dto).await?;
    Ok(session_response(jar, &state, user, tokens, "Signed in"))
}

/// Sign in with an externally verified Google identity
#[utoipa::path(
    post,
    path = "/api/auth/google",
    request_body = GoogleSignInRequest,
    responses(
        (status = 200, description = "Signed in; account created on first sight", body = SessionResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto, jar))]
pub async fn google_sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<GoogleSignInRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let (user, tokens) = AuthService::google_sign_in(&state, dto).await?;
    Ok(session_response(jar, &state, user, tokens, "Signed in"))
}

/// Mint a fresh access token from the refresh cookie
#[utoipa::path(
    get,
    path = "/api/auth/refresh-token",
    responses(
        (status = 200, description = "New access token", body = SessionResponse),
        (status = 401, description = "Missing refresh token", body = MessageResponse),
        (status = 403, description = "Invalid or expired refresh token", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar))]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SessionResponse>, AppError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Missing refresh token")))?;

    let access_token = AuthService::refresh(&state, &token)?;
    Ok(Json(SessionResponse {
        success: true,
        message: "Access token refreshed".to_string(),
        token: Some(access_token),
        user_info: None,
    }))
}

/// Clear the refresh cookie
#[utoipa::path(
    get,
    path = "/api/auth/sign-out",
    responses(
        (status = 200, description = "Refresh cookie cleared", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(jar))]
pub async fn sign_out(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    // Idempotent: removing an absent cookie is still a success.
    let jar = jar.remove(Cookie::build((REFRESH_COOKIE, "")).path("/api").build());
    (jar, Json(MessageResponse::new("Signed out")))
}

/// Request a password recovery email
#[utoipa::path(
    post,
    path = "/api/auth/forget-password",
    request_body = ForgetPasswordRequest,
    responses(
        (status = 200, description = "Recovery email sent", body = MessageResponse),
        (status = 404, description = "No account for that email", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn forget_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::forget_password(&state, dto).await?;
    Ok(Json(MessageResponse::new(
        "Password recovery email sent. The link expires in 5 minutes.",
    )))
}

/// Replace the password using a mailed recovery token
#[utoipa::path(
    post,
    path = "/api/auth/recover-password",
    params(TokenQuery),
    request_body = RecoverPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Missing token or password", body = MessageResponse),
        (status = 401, description = "Invalid or expired recovery token", body = MessageResponse),
        (status = 404, description = "No account for the token's email", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, params, dto))]
pub async fn recover_password(
    State(state): State<AppState>,
    Query(params): Query<TokenQuery>,
    ValidatedJson(dto): ValidatedJson<RecoverPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::recover_password(&state, params.token.as_deref(), &dto.password).await?;
    Ok(Json(MessageResponse::new(
        "Password has been reset. You can now sign in with your new password.",
    )))
}
