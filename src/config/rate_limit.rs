use std::env;
use std::time::Duration;

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_secs(name: &str, default: u64) -> Duration {
    Duration::from_secs(
        env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default),
    )
}

/// Fixed-window budgets per endpoint class.
///
/// Each class has an independent budget: exceeding one never affects the
/// others, and the counter resets when its window elapses.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// General API endpoints: 100 requests per 15 minutes
    pub general_max: u32,
    pub general_window: Duration,
    /// Authentication endpoints: 5 requests per 15 minutes,
    /// successful requests excluded from the count
    pub auth_max: u32,
    pub auth_window: Duration,
    /// Admin operations: 50 requests per 15 minutes
    pub admin_max: u32,
    pub admin_window: Duration,
    /// Test submission: 10 requests per hour
    pub test_submission_max: u32,
    pub test_submission_window: Duration,
    /// Bulk question import: 3 requests per hour
    pub bulk_import_max: u32,
    pub bulk_import_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general_max: 100,
            general_window: Duration::from_secs(15 * 60),
            auth_max: 5,
            auth_window: Duration::from_secs(15 * 60),
            admin_max: 50,
            admin_window: Duration::from_secs(15 * 60),
            test_submission_max: 10,
            test_submission_window: Duration::from_secs(60 * 60),
            bulk_import_max: 3,
            bulk_import_window: Duration::from_secs(60 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self {
            general_max: env_u32("RATE_LIMIT_GENERAL_MAX", 100),
            general_window: env_secs("RATE_LIMIT_GENERAL_WINDOW_SECS", 15 * 60),
            auth_max: env_u32("RATE_LIMIT_AUTH_MAX", 5),
            auth_window: env_secs("RATE_LIMIT_AUTH_WINDOW_SECS", 15 * 60),
            admin_max: env_u32("RATE_LIMIT_ADMIN_MAX", 50),
            admin_window: env_secs("RATE_LIMIT_ADMIN_WINDOW_SECS", 15 * 60),
            test_submission_max: env_u32("RATE_LIMIT_TEST_SUBMISSION_MAX", 10),
            test_submission_window: env_secs("RATE_LIMIT_TEST_SUBMISSION_WINDOW_SECS", 60 * 60),
            bulk_import_max: env_u32("RATE_LIMIT_BULK_IMPORT_MAX", 3),
            bulk_import_window: env_secs("RATE_LIMIT_BULK_IMPORT_WINDOW_SECS", 60 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budgets() {
        let config = RateLimitConfig::default();
        assert_eq!(config.general_max, 100);
        assert_eq!(config.auth_max, 5);
        assert_eq!(config.admin_max, 50);
        assert_eq!(config.test_submission_max, 10);
        assert_eq!(config.bulk_import_max, 3);
        assert_eq!(config.general_window, Duration::from_secs(900));
        assert_eq!(config.test_submission_window, Duration::from_secs(3600));
    }
}
