use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::middleware::csrf::csrf_protection;
use crate::middleware::rate_limit::limit_test_submission;
use crate::modules::sessions::controller::{
    auto_submit_session, get_session_state, save_answer, start_session, submit_session,
    track_time,
};
use crate::state::AppState;

use super::controller::{generate_test, get_test, get_test_questions};

/// Mock tests and their sessions, mounted under `/api/tests`. The CSRF
/// layer covers the whole router; safe methods bypass it inside the guard.
pub fn init_tests_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate_test))
        .route("/{testId}", get(get_test))
        .route("/{testId}/questions", get(get_test_questions))
        .route("/{testId}/start", post(start_session))
        .route("/sessions/{sessionId}/answer", put(save_answer))
        .route("/sessions/{sessionId}/time", put(track_time))
        .route(
            "/sessions/{sessionId}/submit",
            post(submit_session).route_layer(middleware::from_fn_with_state(
                state.clone(),
                limit_test_submission,
            )),
        )
        .route("/sessions/{sessionId}/auto-submit", post(auto_submit_session))
        .route("/sessions/{sessionId}/state", get(get_session_state))
        .layer(middleware::from_fn_with_state(state, csrf_protection))
}
