mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use common::{TEST_JWT_SECRET, test_jwt_config, test_state};
use jsonwebtoken::{EncodingKey, Header};
use prepforge::config::rate_limit::RateLimitConfig;
use prepforge::modules::auth::model::Claims;
use prepforge::modules::users::model::UserRole;
use prepforge::router::init_router;
use prepforge::utils::jwt::{create_access_token, create_refresh_token};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn setup_app() -> (axum::Router, prepforge::state::AppState) {
    let state = test_state(RateLimitConfig::default());
    (init_router(state.clone()), state)
}

fn setup_app_with_rate_limit(config: RateLimitConfig) -> axum::Router {
    init_router(test_state(config))
}

fn strict_auth_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        auth_max: 1,
        ..RateLimitConfig::default()
    }
}

fn user_token(user_id: Uuid, role: &UserRole) -> String {
    create_access_token(user_id, "test@example.com", role, &test_jwt_config()).unwrap()
}

/// A token whose signature and expiry are valid but whose issued-at lies
/// beyond the 24-hour session ceiling.
fn stale_token(user_id: Uuid) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        email: "stale@example.com".to_string(),
        role: "user".to_string(),
        iat: now - 25 * 60 * 60,
        exp: now + 3600,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_no_token_is_401_authentication_required() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
async fn test_garbage_token_is_403_invalid() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_stale_token_is_401_session_expired() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", stale_token(Uuid::new_v4())))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Session expired");
}

#[tokio::test]
async fn test_valid_token_via_header_attaches_identity() {
    let (app, _) = setup_app();
    let user_id = Uuid::new_v4();

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", user_token(user_id, &UserRole::User)),
        )
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user_id"], user_id.to_string());
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_cookie_takes_precedence_over_header() {
    let (app, _) = setup_app();
    let cookie_user = Uuid::new_v4();

    // The header token is garbage: if the cookie wins, the request succeeds.
    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header(
            header::COOKIE,
            format!("accessToken={}", user_token(cookie_user, &UserRole::User)),
        )
        .header(header::AUTHORIZATION, "Bearer garbage")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user_id"], cookie_user.to_string());
}

#[tokio::test]
async fn test_admin_route_rejects_non_admin_role() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/admin/users")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", user_token(Uuid::new_v4(), &UserRole::User)),
        )
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Admin access required");
}

#[tokio::test]
async fn test_admin_route_admits_admin_role() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/admin/users")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", user_token(Uuid::new_v4(), &UserRole::Admin)),
        )
        .body(Body::empty())
        .unwrap();

    // Past the gate: the handler fails on the unreachable test database
    // rather than on authorization.
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_admin_route_without_token_is_401() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/admin/users")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_csrf_token_missing_is_403() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/tests/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", user_token(Uuid::new_v4(), &UserRole::User)),
        )
        .body(Body::from("{}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"], "CSRF token missing");
}

#[tokio::test]
async fn test_csrf_wrong_token_is_403() {
    let (app, state) = setup_app();
    let user_id = Uuid::new_v4();
    state.csrf_store.generate(user_id);

    let request = Request::builder()
        .method("POST")
        .uri("/api/tests/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", user_token(user_id, &UserRole::User)),
        )
        .header("x-csrf-token", "0".repeat(64))
        .body(Body::from("{}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid CSRF token");
}

#[tokio::test]
async fn test_csrf_valid_token_passes_guard() {
    let (app, state) = setup_app();
    let user_id = Uuid::new_v4();
    let csrf_token = state.csrf_store.generate(user_id);

    let request = Request::builder()
        .method("POST")
        .uri("/api/tests/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", user_token(user_id, &UserRole::User)),
        )
        .header("x-csrf-token", csrf_token)
        .body(Body::from("{}"))
        .unwrap();

    // The guard passes; the handler then fails on the unreachable test
    // database, which is the expected terminal state here.
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_csrf_token_accepted_from_body_field() {
    let (app, state) = setup_app();
    let user_id = Uuid::new_v4();
    let csrf_token = state.csrf_store.generate(user_id);

    let request = Request::builder()
        .method("POST")
        .uri("/api/tests/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", user_token(user_id, &UserRole::User)),
        )
        .body(Body::from(
            serde_json::to_string(&json!({ "_csrf": csrf_token })).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_csrf_skipped_for_safe_methods() {
    let (app, _) = setup_app();

    // GET under the CSRF-layered router: no CSRF token, but the request
    // reaches the handler (which rejects the malformed id instead).
    let request = Request::builder()
        .method("GET")
        .uri("/api/tests/not-a-uuid")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", user_token(Uuid::new_v4(), &UserRole::User)),
        )
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid testId format");
}

#[tokio::test]
async fn test_auth_rate_limit_exceeded() {
    let app = setup_app_with_rate_limit(strict_auth_rate_limit());

    let make_request = || {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "192.168.1.100")
            .body(Body::from(
                serde_json::to_string(&json!({
                    "email": "test@example.com",
                    "password": "password123"
                }))
                .unwrap(),
            ))
            .unwrap()
    };

    // First request is processed (and fails on the unreachable database),
    // not rate limited.
    let response1 = app.clone().oneshot(make_request()).await.unwrap();
    assert_ne!(response1.status(), StatusCode::TOO_MANY_REQUESTS);

    let response2 = app.oneshot(make_request()).await.unwrap();
    assert_eq!(response2.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = body_json(response2).await;
    assert_eq!(
        body["error"],
        "Too many authentication attempts, please try again later."
    );
}

#[tokio::test]
async fn test_different_ips_have_separate_limits() {
    let app = setup_app_with_rate_limit(strict_auth_rate_limit());

    let make_request = |ip: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(
                serde_json::to_string(&json!({
                    "email": "test@example.com",
                    "password": "password123"
                }))
                .unwrap(),
            ))
            .unwrap()
    };

    let response1 = app.clone().oneshot(make_request("10.0.0.1")).await.unwrap();
    assert_ne!(response1.status(), StatusCode::TOO_MANY_REQUESTS);

    // Same budget, different client: not rate limited.
    let response2 = app.oneshot(make_request("10.0.0.2")).await.unwrap();
    assert_ne!(response2.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_successful_requests_do_not_burn_auth_budget() {
    let app = setup_app_with_rate_limit(strict_auth_rate_limit());
    let token = user_token(Uuid::new_v4(), &UserRole::User);

    // /api/auth/me is in the auth class; each call succeeds, so the single
    // slot keeps being handed back.
    for _ in 0..3 {
        let request = Request::builder()
            .method("GET")
            .uri("/api/auth/me")
            .header("x-forwarded-for", "203.0.113.50")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_general_rate_limit_applies_to_api_tree() {
    let config = RateLimitConfig {
        general_max: 2,
        ..RateLimitConfig::default()
    };
    let app = setup_app_with_rate_limit(config);

    let make_request = || {
        Request::builder()
            .method("GET")
            .uri("/api/auth/me")
            .header("x-forwarded-for", "172.16.0.1")
            .body(Body::empty())
            .unwrap()
    };

    // Budget 2: the first two 401s are processed, the third is limited.
    for _ in 0..2 {
        let response = app.clone().oneshot(make_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app.oneshot(make_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_health_endpoint_outside_rate_limited_tree() {
    let config = RateLimitConfig {
        general_max: 1,
        ..RateLimitConfig::default()
    };
    let app = setup_app_with_rate_limit(config);

    for _ in 0..3 {
        let request = Request::builder()
            .method("GET")
            .uri("/health")
            .header("x-forwarded-for", "172.16.0.2")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_refresh_without_cookie_is_401() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Refresh token required");
}

#[tokio::test]
async fn test_refresh_with_garbage_cookie_is_403() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header(header::COOKIE, "refreshToken=not.a.token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn test_refresh_with_valid_cookie_sets_new_access_token() {
    let (app, _) = setup_app();
    let refresh = create_refresh_token(
        Uuid::new_v4(),
        "refresh@example.com",
        &UserRole::User,
        &test_jwt_config(),
    )
    .unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header(header::COOKIE, format!("refreshToken={}", refresh))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    assert!(set_cookie.contains("accessToken="));

    let body = body_json(response).await;
    assert_eq!(body["message"], "Token refreshed successfully");
}

#[tokio::test]
async fn test_logout_clears_session_cookies() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cleared = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    assert!(cleared.contains("accessToken="));
    assert!(cleared.contains("refreshToken="));
    assert!(cleared.contains("csrfToken="));
}

#[tokio::test]
async fn test_malformed_session_id_is_400() {
    let (app, _) = setup_app();

    for bad_id in ["not-a-uuid", "123", "SELECT * FROM users"] {
        let request = Request::builder()
            .method("GET")
            .uri(format!("/api/results/{}", urlencode(bad_id)))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", user_token(Uuid::new_v4(), &UserRole::User)),
            )
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "id {:?}", bad_id);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid sessionId format");
    }
}

fn urlencode(input: &str) -> String {
    input
        .bytes()
        .map(|b| match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}
