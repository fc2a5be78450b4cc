use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_profile, get_users};

pub fn init_users_router() -> Router<AppState> {
    Router::new().route("/me", get(get_profile))
}

/// Admin listing, mounted under the admin router's middleware stack.
pub fn init_users_admin_router() -> Router<AppState> {
    Router::new().route("/", get(get_users))
}
