use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    forget_password, google_sign_in, recover_password, refresh_token, sign_out, signin, signup,
    verify_email,
};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/verify-email", get(verify_email))
        .route("/signin", post(signin))
        .route("/google", post(google_sign_in))
        .route("/refresh-token", get(refresh_token))
        .route("/sign-out", get(sign_out))
        .route("/forget-password", post(forget_password))
        .route("/recover-password", post(recover_password))
}
