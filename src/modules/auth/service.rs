//! The session/identity flows.
//!
//! Signup is stateless: the signed verification claim is the only record of a
//! pending registration, and confirming it is what creates the row. Sign-in,
//! refresh, and sign-out never write to the store at all.

use axum::http::StatusCode;
use rand::Rng;
use rand::distributions::Alphanumeric;
use sqlx::PgPool;
use tracing::{error, instrument, warn};

use crate::modules::users::model::{NewUser, User};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::{Claim, TokenError};
use crate::utils::password::{generate_throwaway_secret, hash_password, verify_password};

use super::model::{ForgetPasswordRequest, GoogleSignInRequest, SigninRequest, SignupRequest};

/// Pair minted on every successful authentication event.
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService;

impl AuthService {
    /// Step one of registration: both uniqueness pre-checks, then a mailed
    /// verification link. No row is created here.
    #[instrument(skip_all, fields(email = %dto.email))]
    pub async fn signup(state: &AppState, dto: SignupRequest) -> Result<(), AppError> {
        if UserService::find_by_username(&state.db, &dto.username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Username is already taken"
            )));
        }
        if UserService::find_by_email(&state.db, &dto.email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Email is already registered"
            )));
        }

        let claim = Claim::Verification {
            username: dto.username.clone(),
            email: dto.email.clone(),
            password: dto.password,
        };
        let token = state
            .tokens
            .mint(claim, Some(state.jwt_config.verification_token_expiry))?;

        // Availability over delivery: a mail outage must not fail the signup.
        if let Err(err) = state
            .email
            .send_verification_email(&dto.email, &dto.username, &token)
            .await
        {
            error!(email = %dto.email, error = ?err, "failed to send verification email");
        }

        Ok(())
    }

    /// Turns a verification link into a durable, verified account and opens a
    /// session. Confirming the same link twice reuses the existing account
    /// instead of failing: the token is the sole source of truth for the
    /// pending signup, so a second click must land on the same row.
    #[instrument(skip_all)]
    pub async fn confirm_verification(
        state: &AppState,
        token: &str,
    ) -> Result<(User, SessionTokens), AppError> {
        let invalid =
            || AppError::unauthorized(anyhow::anyhow!("Invalid or expired verification link"));

        let Claim::Verification {
            username,
            email,
            password,
        } = state.tokens.verify(token).map_err(|_| invalid())?
        else {
            return Err(invalid());
        };

        let user = match UserService::find_by_email(&state.db, &email).await? {
            Some(existing) => existing,
            None => {
                let new_user = NewUser {
                    username,
                    email: email.clone(),
                    password_hash: hash_password(&password)?,
                    verified: true,
                    federated: false,
                    photo_url: None,
                };
                Self::create_or_reuse(&state.db, new_user, &email).await?
            }
        };

        let tokens = Self::issue_session(state, &user)?;
        Ok((user, tokens))
    }

    /// Password sign-in. Unknown email, unverified account, and wrong
    /// password all answer with the same generic 401 so responses carry no
    /// information about which accounts exist.
    #[instrument(skip_all, fields(email = %dto.email))]
    pub async fn signin(
        state: &AppState,
        dto: SigninRequest,
    ) -> Result<(User, SessionTokens), AppError> {
        let invalid = || AppError::unauthorized(anyhow::anyhow!("Invalid email or password"));

        let user = UserService::find_by_email(&state.db, &dto.email)
            .await?
            .ok_or_else(invalid)?;

        if !user.verified {
            warn!(user_id = %user.id, "sign-in attempt on unverified account");
            return Err(invalid());
        }

        if !verify_password(&dto.password, &user.password)? {
            return Err(invalid());
        }

        let tokens = Self::issue_session(state, &user)?;
        Ok((user, tokens))
    }

    /// Sign-in and registration unified into one idempotent operation: the
    /// provider already verified the email, so first sight creates the
    /// account and every later call lands on the same row.
    #[instrument(skip_all, fields(email = %dto.email))]
    pub async fn google_sign_in(
        state: &AppState,
        dto: GoogleSignInRequest,
    ) -> Result<(User, SessionTokens), AppError> {
        let user = match UserService::find_by_email(&state.db, &dto.email).await? {
            Some(existing) => existing,
            None => {
                // The asserted display name may already belong to someone else.
                let username = if UserService::find_by_username(&state.db, &dto.username)
                    .await?
                    .is_some()
                {
                    format!("{}-{}", dto.username, random_suffix())
                } else {
                    dto.username.clone()
                };

                let new_user = NewUser {
                    username,
                    email: dto.email.clone(),
                    password_hash: hash_password(&generate_throwaway_secret())?,
                    verified: true,
                    federated: true,
                    photo_url: dto.photo_url.clone(),
                };
                Self::create_or_reuse(&state.db, new_user, &dto.email).await?
            }
        };

        let tokens = Self::issue_session(state, &user)?;
        Ok((user, tokens))
    }

    /// Mints a fresh access token from a valid refresh token. The refresh
    /// token itself is not rotated and nothing is written, so concurrent
    /// calls are safe.
    pub fn refresh(state: &AppState, refresh_token: &str) -> Result<String, AppError> {
        let claim = state
            .refresh_tokens
            .verify(refresh_token)
            .map_err(|err| match err {
                TokenError::Expired => AppError::forbidden(anyhow::anyhow!("Refresh token expired")),
                _ => AppError::forbidden(anyhow::anyhow!("Invalid refresh token")),
            })?;

        let Claim::Refresh { user_id } = claim else {
            return Err(AppError::forbidden(anyhow::anyhow!("Invalid refresh token")));
        };

        state
            .tokens
            .mint(
                Claim::Access { user_id },
                Some(state.jwt_config.access_token_expiry),
            )
    }

    /// Mails a short-lived recovery link. Unknown emails are a 404; a mail
    /// outage is logged and swallowed so the caller still gets a success.
    #[instrument(skip_all, fields(email = %dto.email))]
    pub async fn forget_password(
        state: &AppState,
        dto: ForgetPasswordRequest,
    ) -> Result<(), AppError> {
        let user = UserService::find_by_email(&state.db, &dto.email)
            .await?
            .ok_or_else(|| {
                AppError::not_found(anyhow::anyhow!("No account found for that email"))
            })?;

        let token = state.tokens.mint(
            Claim::Recovery {
                email: user.email.clone(),
            },
            Some(state.jwt_config.recovery_token_expiry),
        )?;

        if let Err(err) = state
            .email
            .send_recovery_email(&user.email, &user.username, &token)
            .await
        {
            error!(email = %user.email, error = ?err, "failed to send recovery email");
        }

        Ok(())
    }

    /// Replaces the password named by a recovery token. The token is not
    /// revoked on use (there is nothing server-side to revoke); its 5-minute
    /// expiry bounds the replay window, and a replay re-applies the same hash.
    #[instrument(skip_all)]
    pub async fn recover_password(
        state: &AppState,
        token: Option<&str>,
        password: &str,
    ) -> Result<User, AppError> {
        if password.trim().is_empty() {
            return Err(AppError::bad_request(anyhow::anyhow!("Password is required")));
        }
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Token is required")))?;

        let invalid = || {
            AppError::unauthorized(anyhow::anyhow!(
                "Invalid or expired token. Password not changed."
            ))
        };

        let Claim::Recovery { email } = state.tokens.verify(token).map_err(|_| invalid())? else {
            return Err(invalid());
        };

        let password_hash = hash_password(password)?;
        UserService::update_password(&state.db, &email, &password_hash).await
    }

    /// Every successful authentication event mints the same pair: a
    /// short-lived access token and a long-lived refresh token, each signed
    /// with its own secret.
    pub fn issue_session(state: &AppState, user: &User) -> Result<SessionTokens, AppError> {
        let access_token = state.tokens.mint(
            Claim::Access { user_id: user.id },
            Some(state.jwt_config.access_token_expiry),
        )?;
        let refresh_token = state.refresh_tokens.mint(
            Claim::Refresh { user_id: user.id },
            Some(state.jwt_config.refresh_token_expiry),
        )?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Insert, falling back to the existing row when a concurrent request won
    /// the race for the same email.
    async fn create_or_reuse(
        db: &PgPool,
        new_user: NewUser,
        email: &str,
    ) -> Result<User, AppError> {
        match UserService::create(db, new_user).await {
            Ok(created) => Ok(created),
            Err(err) if err.status == StatusCode::CONFLICT => {
                UserService::find_by_email(db, email).await?.ok_or(err)
            }
            Err(err) => Err(err),
        }
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}
