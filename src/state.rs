use sqlx::PgPool;

use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::email::EmailConfig;
use crate::config::jwt::JwtConfig;
use crate::utils::email::EmailService;
use crate::utils::jwt::TokenCodec;

/// Shared application state.
///
/// The collaborators every flow needs are constructed once here and injected
/// through axum state; nothing reads configuration or keys ambiently. The two
/// codecs are keyed independently so a leaked refresh secret cannot forge
/// access tokens, and vice versa.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    /// Signs and verifies access, verification, and recovery claims.
    pub tokens: TokenCodec,
    /// Signs and verifies refresh claims only.
    pub refresh_tokens: TokenCodec,
    pub email: EmailService,
}

pub async fn init_app_state() -> AppState {
    let jwt_config = JwtConfig::from_env();

    AppState {
        db: init_db_pool().await,
        tokens: TokenCodec::new(&jwt_config.secret),
        refresh_tokens: TokenCodec::new(&jwt_config.refresh_secret),
        email: EmailService::new(EmailConfig::from_env()),
        cors_config: CorsConfig::from_env(),
        jwt_config,
    }
}
