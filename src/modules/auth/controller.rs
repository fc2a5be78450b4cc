use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::User;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    LoginRequest, LoginResponse, MeResponse, MessageResponse, OAuthCallbackQuery,
    RegisterRequestDto,
};
use super::service::AuthService;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

const ACCESS_COOKIE_MAX_AGE_SECS: i64 = 15 * 60;
const REFRESH_COOKIE_MAX_AGE_SECS: i64 = 24 * 60 * 60;
const CSRF_COOKIE_MAX_AGE_SECS: i64 = 24 * 60 * 60;

fn cookie_security() -> (bool, SameSite) {
    let production = std::env::var("ENVIRONMENT")
        .map(|env| env == "production")
        .unwrap_or(false);
    if production {
        (true, SameSite::Strict)
    } else {
        (false, SameSite::Lax)
    }
}

fn session_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    http_only: bool,
) -> Cookie<'static> {
    let (secure, same_site) = cookie_security();
    Cookie::build((name, value))
        .path("/")
        .http_only(http_only)
        .secure(secure)
        .same_site(same_site)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

fn session_cookies(
    access_token: String,
    refresh_token: String,
    csrf_token: String,
    jar: CookieJar,
) -> CookieJar {
    jar.add(session_cookie(
        "accessToken",
        access_token,
        ACCESS_COOKIE_MAX_AGE_SECS,
        true,
    ))
    .add(session_cookie(
        "refreshToken",
        refresh_token,
        REFRESH_COOKIE_MAX_AGE_SECS,
        true,
    ))
    // Readable by the frontend so it can echo the token back in
    // X-CSRF-Token.
    .add(session_cookie(
        "csrfToken",
        csrf_token,
        CSRF_COOKIE_MAX_AGE_SECS,
        false,
    ))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = User),
        (status = 400, description = "Bad request - validation error or email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = AuthService::register_user(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto, jar))]
pub async fn login_user(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let (user, tokens) = AuthService::login_user(&state.db, dto, &state.jwt_config).await?;
    let csrf_token = state.csrf_store.generate(user.id);

    let jar = session_cookies(
        tokens.access_token.clone(),
        tokens.refresh_token.clone(),
        csrf_token.clone(),
        jar,
    );

    Ok((
        jar,
        Json(LoginResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            csrf_token,
            user,
        }),
    ))
}

/// Initiate the Google OAuth flow
#[utoipa::path(
    get,
    path = "/api/auth/google",
    responses(
        (status = 303, description = "Redirect to the Google consent screen")
    ),
    tag = "Authentication"
)]
pub async fn google_login(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.oauth_config.authorize_redirect_url())
}

/// Google OAuth callback
#[utoipa::path(
    get,
    path = "/api/auth/callback",
    responses(
        (status = 303, description = "Redirect to the frontend dashboard on success, or to the login page with an error flag")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, query, jar))]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
    jar: CookieJar,
) -> Response {
    let failure =
        Redirect::to(&format!("{}/login?error=auth_failed", state.oauth_config.frontend_url));

    let Some(code) = query.code else {
        return failure.into_response();
    };

    let profile =
        match AuthService::exchange_oauth_code(&state.http, &state.oauth_config, &code).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = %err.error, "OAuth code exchange failed");
                return failure.into_response();
            }
        };

    let user = match UserService::find_or_create_from_oauth(&state.db, &profile).await {
        Ok(user) => user,
        Err(err) => {
            warn!(error = %err.error, "OAuth identity lookup failed");
            return failure.into_response();
        }
    };

    let tokens = match AuthService::issue_tokens_for(&user, &state.jwt_config) {
        Ok(tokens) => tokens,
        Err(err) => {
            warn!(error = %err.error, "Token issuance failed");
            return failure.into_response();
        }
    };

    let csrf_token = state.csrf_store.generate(user.id);
    let jar = session_cookies(tokens.access_token, tokens.refresh_token, csrf_token, jar);

    (
        jar,
        Redirect::to(&format!("{}/dashboard", state.oauth_config.frontend_url)),
    )
        .into_response()
}

/// Refresh the access token using the refresh cookie
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Token refreshed successfully", body = MessageResponse),
        (status = 401, description = "Refresh token required", body = ErrorResponse),
        (status = 403, description = "Invalid or expired refresh token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar))]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let refresh = jar
        .get("refreshToken")
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::unauthorized("Refresh token required"))?;

    let access_token = AuthService::refresh_access_token(&refresh, &state.jwt_config)?;

    let jar = jar.add(session_cookie(
        "accessToken",
        access_token,
        ACCESS_COOKIE_MAX_AGE_SECS,
        true,
    ));

    Ok((
        jar,
        Json(MessageResponse {
            message: "Token refreshed successfully".to_string(),
        }),
    ))
}

/// Logout and clear session cookies
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out successfully", body = MessageResponse)
    ),
    tag = "Authentication"
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar
        .remove(Cookie::from("accessToken"))
        .remove(Cookie::from("refreshToken"))
        .remove(Cookie::from("csrfToken"));

    (
        jar,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Get the authenticated caller's identity claims
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current identity", body = MeResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Invalid or expired token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: auth_user.0.sub.clone(),
        email: auth_user.0.email.clone(),
        role: auth_user.0.role.clone(),
    })
}
