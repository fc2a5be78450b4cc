use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::csrf::csrf_protection;
use crate::middleware::rate_limit::{limit_admin, limit_auth, limit_general};
use crate::middleware::role::require_admin;
use crate::middleware::sanitize::sanitize_request;
use crate::modules::auth::router::init_auth_router;
use crate::modules::concepts::router::init_concepts_admin_router;
use crate::modules::questions::router::init_questions_admin_router;
use crate::modules::results::router::init_results_router;
use crate::modules::tests::router::init_tests_router;
use crate::modules::trends::router::init_trends_router;
use crate::modules::users::router::{init_users_admin_router, init_users_router};
use crate::state::AppState;

async fn health() -> &'static str {
    "ok"
}

/// Admin surface: authentication, admin role, admin rate budget, and CSRF
/// on state-changing methods, in that order.
fn init_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/users", init_users_admin_router())
        .nest("/concepts", init_concepts_admin_router())
        .nest("/questions", init_questions_admin_router(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), csrf_protection))
        .layer(middleware::from_fn_with_state(state.clone(), limit_admin))
        .layer(middleware::from_fn_with_state(state, require_admin))
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .nest(
                    "/auth",
                    init_auth_router()
                        .layer(middleware::from_fn_with_state(state.clone(), limit_auth)),
                )
                .nest("/users", init_users_router())
                .nest("/admin", init_admin_router(state.clone()))
                .nest("/tests", init_tests_router(state.clone()))
                .nest("/results", init_results_router(state.clone()))
                .nest("/trends", init_trends_router(state.clone()))
                // Outermost stages of the pipeline: the general request
                // budget runs first, then input sanitization.
                .layer(middleware::from_fn(sanitize_request))
                .layer(middleware::from_fn_with_state(state.clone(), limit_general)),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    axum::http::HeaderName::from_static("x-csrf-token"),
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
