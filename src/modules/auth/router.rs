use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    google_callback, google_login, login_user, logout, me, refresh_token, register_user,
};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/google", get(google_login))
        .route("/callback", get(google_callback))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .route("/me", get(me))
}
