//! Middleware modules for request processing.
//!
//! The request pipeline, outermost first: rate limiting, input
//! sanitization, authentication, CSRF protection (state-changing methods
//! only), then role checks.
//!
//! # Modules
//!
//! - [`auth`]: JWT authentication extractor with session freshness enforcement
//! - [`csrf`]: Per-user CSRF token store and validation middleware
//! - [`rate_limit`]: Fixed-window request budgets per endpoint class
//! - [`role`]: Role-based authorization middleware
//! - [`sanitize`]: Recursive input sanitization for bodies and query strings
//!
//! # Authentication Flow
//!
//! 1. Client sends the access token in the `accessToken` cookie or an
//!    `Authorization: Bearer <token>` header (the cookie wins when both are
//!    present)
//! 2. The `AuthUser` extractor verifies the signature and expiry, then
//!    rejects tokens issued more than 24 hours ago with a distinct
//!    "Session expired" response
//! 3. Role middleware checks the claims attached by the extractor
//! 4. The handler executes if all checks pass

pub mod auth;
pub mod csrf;
pub mod rate_limit;
pub mod role;
pub mod sanitize;
