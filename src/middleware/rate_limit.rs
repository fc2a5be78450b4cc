//! Fixed-window rate limiting per (client, endpoint class).
//!
//! Each endpoint class carries its own budget and window; counters reset
//! when the window elapses. The auth class does not count successful
//! requests: the slot is taken optimistically and handed back when the
//! response status is below 400, so only failed attempts burn the budget.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::rate_limit::RateLimitConfig;
use crate::state::AppState;
use crate::utils::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    General,
    Auth,
    Admin,
    TestSubmission,
    BulkImport,
}

impl EndpointClass {
    pub fn message(&self) -> &'static str {
        match self {
            EndpointClass::General => "Too many requests from this IP, please try again later.",
            EndpointClass::Auth => "Too many authentication attempts, please try again later.",
            EndpointClass::Admin => "Too many admin requests, please try again later.",
            EndpointClass::TestSubmission => {
                "Too many test submissions, please try again later."
            }
            EndpointClass::BulkImport => {
                "Too many bulk import requests, please try again later."
            }
        }
    }

    /// Successful requests in this class do not count toward the budget.
    fn skips_successful(&self) -> bool {
        matches!(self, EndpointClass::Auth)
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    started_at: Instant,
}

/// In-process window counters, injected through `AppState`.
#[derive(Debug)]
pub struct RateLimiterStore {
    config: RateLimitConfig,
    windows: Mutex<HashMap<(String, EndpointClass), Window>>,
}

impl RateLimiterStore {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn budget(&self, class: EndpointClass) -> (u32, Duration) {
        match class {
            EndpointClass::General => (self.config.general_max, self.config.general_window),
            EndpointClass::Auth => (self.config.auth_max, self.config.auth_window),
            EndpointClass::Admin => (self.config.admin_max, self.config.admin_window),
            EndpointClass::TestSubmission => (
                self.config.test_submission_max,
                self.config.test_submission_window,
            ),
            EndpointClass::BulkImport => {
                (self.config.bulk_import_max, self.config.bulk_import_window)
            }
        }
    }

    /// Take one slot from the client's window; false means the budget for
    /// this window is spent.
    pub fn try_acquire(&self, key: &str, class: EndpointClass) -> bool {
        let (max, window) = self.budget(class);
        let now = Instant::now();

        let mut windows = self.windows.lock().expect("rate limiter lock poisoned");
        let entry = windows
            .entry((key.to_string(), class))
            .or_insert(Window {
                count: 0,
                started_at: now,
            });

        if now.duration_since(entry.started_at) >= window {
            entry.count = 0;
            entry.started_at = now;
        }

        if entry.count >= max {
            return false;
        }

        entry.count += 1;
        true
    }

    /// Hand back a slot taken by `try_acquire`, used by classes that do not
    /// count successful requests.
    pub fn release(&self, key: &str, class: EndpointClass) {
        let mut windows = self.windows.lock().expect("rate limiter lock poisoned");
        if let Some(entry) = windows.get_mut(&(key.to_string(), class)) {
            entry.count = entry.count.saturating_sub(1);
        }
    }
}

/// Client key: first `X-Forwarded-For` entry when present, else the peer
/// address.
fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return forwarded.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn limit_requests(
    state: AppState,
    req: Request,
    next: Next,
    class: EndpointClass,
) -> Response {
    let key = client_key(&req);

    if !state.rate_limiter.try_acquire(&key, class) {
        return AppError::too_many_requests(class.message()).into_response();
    }

    let response = next.run(req).await;

    if class.skips_successful() && response.status().as_u16() < 400 {
        state.rate_limiter.release(&key, class);
    }

    response
}

pub async fn limit_general(State(state): State<AppState>, req: Request, next: Next) -> Response {
    limit_requests(state, req, next, EndpointClass::General).await
}

pub async fn limit_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    limit_requests(state, req, next, EndpointClass::Auth).await
}

pub async fn limit_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    limit_requests(state, req, next, EndpointClass::Admin).await
}

pub async fn limit_test_submission(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    limit_requests(state, req, next, EndpointClass::TestSubmission).await
}

pub async fn limit_bulk_import(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    limit_requests(state, req, next, EndpointClass::BulkImport).await
}
