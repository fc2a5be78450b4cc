//! CSRF protection for state-changing requests.
//!
//! Each authenticated user holds at most one active CSRF token. Tokens are
//! 32 random bytes hex-encoded (64 characters) with a 24-hour expiry;
//! issuing a new token overwrites the old one and sweeps expired records
//! from the whole store. The sweep is O(n) per issuance, which is fine at
//! this scale; the per-key expiry check on read already makes it optional.

use std::collections::HashMap;
use std::sync::Mutex;

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde_json::Value;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

const TOKEN_BYTES: usize = 32;
const BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
struct CsrfRecord {
    token: String,
    expires_at: DateTime<Utc>,
}

/// In-process CSRF token store, injected through `AppState` so tests and a
/// future external cache can swap it without touching the middleware.
#[derive(Debug)]
pub struct CsrfTokenStore {
    records: Mutex<HashMap<Uuid, CsrfRecord>>,
    ttl: Duration,
}

impl Default for CsrfTokenStore {
    fn default() -> Self {
        Self::with_ttl(Duration::hours(24))
    }
}

impl CsrfTokenStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Issue a token for a user, replacing any previous one and sweeping
    /// expired records store-wide.
    pub fn generate(&self, user_id: Uuid) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let now = Utc::now();
        let mut records = self.records.lock().expect("csrf store lock poisoned");
        records.insert(
            user_id,
            CsrfRecord {
                token: token.clone(),
                expires_at: now + self.ttl,
            },
        );
        records.retain(|_, record| record.expires_at >= now);

        token
    }

    /// True only for the exact token most recently issued to this user and
    /// not yet expired. Expired records are removed on the way out.
    pub fn validate(&self, user_id: Uuid, token: &str) -> bool {
        let mut records = self.records.lock().expect("csrf store lock poisoned");

        let Some(record) = records.get(&user_id) else {
            return false;
        };

        if record.expires_at < Utc::now() {
            records.remove(&user_id);
            return false;
        }

        records[&user_id].token == token
    }

    pub fn remove(&self, user_id: Uuid) {
        self.records
            .lock()
            .expect("csrf store lock poisoned")
            .remove(&user_id);
    }
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Middleware validating the CSRF token on state-changing operations.
///
/// Safe methods bypass the check entirely. For everything else the caller
/// must be authenticated and present the token in the `X-CSRF-Token` header
/// or the `_csrf` body field.
pub async fn csrf_protection(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if is_safe_method(req.method()) {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();

    let auth_user = match AuthUser::from_request_parts(&mut parts, &state).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };
    let user_id = match auth_user.user_id() {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };

    let header_token = parts
        .headers
        .get("x-csrf-token")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let (token, body) = match header_token {
        Some(token) => (Some(token), body),
        None => {
            // Fall back to the `_csrf` body field; the body is re-attached
            // for the handler either way.
            let bytes = match axum::body::to_bytes(body, BODY_LIMIT).await {
                Ok(bytes) => bytes,
                Err(_) => {
                    return AppError::bad_request("Invalid request body").into_response();
                }
            };
            let token = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|value| {
                    value
                        .get("_csrf")
                        .and_then(|t| t.as_str())
                        .map(str::to_string)
                });
            (token, Body::from(bytes))
        }
    };

    let Some(token) = token else {
        return AppError::forbidden("CSRF token missing").into_response();
    };

    if !state.csrf_store.validate(user_id, &token) {
        return AppError::forbidden("Invalid CSRF token").into_response();
    }

    next.run(Request::from_parts(parts, body)).await
}
