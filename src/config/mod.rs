//! Configuration modules for the Prepforge API.
//!
//! Each submodule handles one aspect of configuration, loaded from
//! environment variables with development defaults.
//!
//! # Modules
//!
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: JWT authentication configuration
//! - [`oauth`]: Google OAuth 2.0 endpoints and credentials
//! - [`rate_limit`]: Per-class fixed-window rate limit budgets
//! - [`trends`]: External trend/prediction service endpoint

pub mod cors;
pub mod database;
pub mod jwt;
pub mod oauth;
pub mod rate_limit;
pub mod trends;
