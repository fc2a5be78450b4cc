use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::middleware::rate_limit::limit_bulk_import;
use crate::state::AppState;

use super::controller::{
    bulk_import_questions, count_questions_by_concept, create_question, delete_question,
    get_question, get_questions, update_question,
};

pub fn init_questions_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get_questions))
        .route("/", post(create_question))
        .route("/{id}", get(get_question))
        .route("/{id}", put(update_question))
        .route("/{id}", delete(delete_question))
        .route(
            "/import",
            post(bulk_import_questions)
                .route_layer(middleware::from_fn_with_state(state, limit_bulk_import)),
        )
        .route(
            "/concept/{conceptId}/count",
            get(count_questions_by_concept),
        )
}
