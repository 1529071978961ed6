use sqlx::PgPool;
use stead::config::cors::CorsConfig;
use stead::config::email::EmailConfig;
use stead::config::jwt::JwtConfig;
use stead::state::AppState;
use stead::utils::email::EmailService;
use stead::utils::jwt::TokenCodec;
use stead::utils::password::hash_password;
use uuid::Uuid;

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "access-test-secret-key-for-testing".to_string(),
        refresh_secret: "refresh-test-secret-key-for-testing".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 15_552_000,
        verification_token_expiry: 172_800,
        recovery_token_expiry: 300,
        secure_cookies: false,
    }
}

/// App state with mail disabled and deterministic test secrets, so tests can
/// mint tokens through the same codecs the app verifies with.
pub fn test_state(pool: PgPool) -> AppState {
    let jwt_config = test_jwt_config();
    let email_config = EmailConfig {
        enabled: false,
        smtp_host: "localhost".to_string(),
        smtp_port: 1025,
        smtp_username: String::new(),
        smtp_password: String::new(),
        from_email: "noreply@stead.test".to_string(),
        from_name: "Stead".to_string(),
        frontend_url: "http://localhost:5173".to_string(),
    };

    AppState {
        db: pool,
        tokens: TokenCodec::new(&jwt_config.secret),
        refresh_tokens: TokenCodec::new(&jwt_config.refresh_secret),
        email: EmailService::new(email_config),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        jwt_config,
    }
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Insert a user row directly, bypassing the signup flow.
#[allow(dead_code)]
pub async fn create_test_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    verified: bool,
) -> TestUser {
    let username = generate_unique_username();
    let hashed = hash_password(password).unwrap();

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (username, email, password, verified, federated)
         VALUES ($1, $2, $3, $4, FALSE)
         RETURNING id",
    )
    .bind(&username)
    .bind(email)
    .bind(&hashed)
    .bind(verified)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        username,
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[allow(dead_code)]
pub async fn count_users_with_email(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn generate_unique_username() -> String {
    format!("user-{}", &Uuid::new_v4().to_string()[..8])
}
