use axum::{Router, routing::get};

use crate::modules::users::controller::{get_profile, update_profile};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).patch(update_profile))
}
