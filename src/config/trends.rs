use std::env;

#[derive(Clone, Debug)]
pub struct TrendsConfig {
    /// Base URL of the external prediction/trend service.
    pub ml_service_url: String,
    /// Per-request timeout in seconds before falling back to static defaults.
    pub ml_service_timeout_secs: u64,
}

impl TrendsConfig {
    pub fn from_env() -> Self {
        Self {
            ml_service_url: env::var("ML_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            ml_service_timeout_secs: env::var("ML_SERVICE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }
}
