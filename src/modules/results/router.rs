use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::csrf::csrf_protection;
use crate::state::AppState;

use super::controller::{calculate_result, get_analysis, get_result, get_user_history};

pub fn init_results_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{sessionId}", get(get_result))
        .route("/{sessionId}/analysis", get(get_analysis))
        .route("/user/{userId}/history", get(get_user_history))
        .route(
            "/{sessionId}/calculate",
            post(calculate_result)
                .route_layer(middleware::from_fn_with_state(state, csrf_protection)),
        )
}
