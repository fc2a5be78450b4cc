use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_concept, delete_concept, get_concept, get_concepts, get_concepts_by_category,
    update_concept,
};

pub fn init_concepts_admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_concepts))
        .route("/", post(create_concept))
        .route("/{id}", get(get_concept))
        .route("/{id}", put(update_concept))
        .route("/{id}", delete(delete_concept))
        .route("/category/{category}", get(get_concepts_by_category))
}
