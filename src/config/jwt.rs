use std::env;

/// Signing secrets and lifetimes for every token the API mints.
///
/// Access, verification, and recovery tokens share `secret`; refresh tokens
/// are signed with `refresh_secret` so that a compromise of one key cannot
/// forge tokens of the other family.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub refresh_secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
    pub verification_token_expiry: i64,
    pub recovery_token_expiry: i64,
    pub secure_cookies: bool,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            refresh_secret: env::var("JWT_REFRESH_SECRET")
                .unwrap_or_else(|_| "your-refresh-secret-change-in-production".to_string()),
            access_token_expiry: env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(900), // 15 minutes
            refresh_token_expiry: env::var("JWT_REFRESH_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15_552_000), // 180 days
            verification_token_expiry: env::var("JWT_VERIFICATION_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(172_800), // 48 hours
            recovery_token_expiry: env::var("JWT_RECOVERY_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300), // 5 minutes
            secure_cookies: env::var("COOKIE_SECURE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}
