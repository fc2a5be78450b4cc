use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Origins come from `ALLOWED_ORIGINS` (comma-separated); when unset,
    /// the frontend origin is allowed so the OAuth redirect flow works out
    /// of the box.
    pub fn from_env() -> Self {
        let fallback = env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or(fallback)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}
