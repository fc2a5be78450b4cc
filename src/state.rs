use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::jwt::JwtConfig;
use crate::config::oauth::OAuthConfig;
use crate::config::rate_limit::RateLimitConfig;
use crate::config::trends::TrendsConfig;
use crate::middleware::csrf::CsrfTokenStore;
use crate::middleware::rate_limit::RateLimiterStore;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub oauth_config: OAuthConfig,
    pub trends_config: TrendsConfig,
    pub csrf_store: Arc<CsrfTokenStore>,
    pub rate_limiter: Arc<RateLimiterStore>,
    pub http: reqwest::Client,
}

pub fn init_app_state() -> AppState {
    let trends_config = TrendsConfig::from_env();
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(trends_config.ml_service_timeout_secs))
        .build()
        .expect("Failed to build HTTP client");

    AppState {
        db: init_db_pool(),
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        oauth_config: OAuthConfig::from_env(),
        trends_config,
        csrf_store: Arc::new(CsrfTokenStore::default()),
        rate_limiter: Arc::new(RateLimiterStore::new(RateLimitConfig::from_env())),
        http,
    }
}
