use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::csrf::csrf_protection;
use crate::middleware::role::require_admin;
use crate::state::AppState;

use super::controller::{
    get_concept_trend, get_prediction, get_rankings, get_trends, refresh_trends,
};

pub fn init_trends_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get_trends))
        .route("/rankings", get(get_rankings))
        .route("/prediction", get(get_prediction))
        .route("/concept/{conceptId}", get(get_concept_trend))
        .route(
            "/refresh",
            // Admin gate runs first, then the CSRF check.
            post(refresh_trends)
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    csrf_protection,
                ))
                .route_layer(middleware::from_fn_with_state(state, require_admin)),
        )
}
