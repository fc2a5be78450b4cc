use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::modules::auth::model::Claims;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Sessions older than this are rejected regardless of the token's own
/// expiry claim.
pub const MAX_SESSION_AGE_SECS: usize = 24 * 60 * 60;

/// Extractor that validates the session token and provides the
/// authenticated user's claims.
///
/// The token is read from the `accessToken` cookie, falling back to the
/// `Authorization: Bearer` header. Rejections follow a fixed state machine:
/// no token at all is 401 "Authentication required", a token issued more
/// than 24 hours ago is 401 "Session expired", and anything malformed or
/// with a bad signature is 403 "Invalid or expired token".
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Get the user ID as UUID
    pub fn user_id(&self) -> Result<uuid::Uuid, AppError> {
        uuid::Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    /// Get the user's email
    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Get the user's role string
    pub fn role(&self) -> &str {
        &self.0.role
    }
}

fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get("accessToken") {
        return Some(cookie.value().to_string());
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn is_session_stale(issued_at: usize, now: usize) -> bool {
    now.saturating_sub(issued_at) > MAX_SESSION_AGE_SECS
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            token_from_parts(parts).ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let claims = verify_token(&token, &state.jwt_config)?;

        let now = Utc::now().timestamp() as usize;
        if is_session_stale(claims.iat, now) {
            return Err(AppError::unauthorized("Session expired"));
        }

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn create_test_claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: "test@example.com".to_string(),
            role: "user".to_string(),
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_user_id() {
        let user_id = Uuid::new_v4();
        let auth_user = AuthUser(create_test_claims(&user_id.to_string()));
        assert_eq!(auth_user.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_user_id_rejects_non_uuid_subject() {
        let auth_user = AuthUser(create_test_claims("not-a-uuid"));
        assert!(auth_user.user_id().is_err());
    }

    #[test]
    fn test_session_stale_past_24h() {
        let iat = 1_700_000_000;
        assert!(is_session_stale(iat, iat + MAX_SESSION_AGE_SECS + 1));
    }

    #[test]
    fn test_session_fresh_within_24h() {
        let iat = 1_700_000_000;
        assert!(!is_session_stale(iat, iat));
        assert!(!is_session_stale(iat, iat + MAX_SESSION_AGE_SECS));
    }

    #[test]
    fn test_session_iat_in_future_is_fresh() {
        let iat = 1_700_000_000;
        assert!(!is_session_stale(iat, iat - 10));
    }
}
