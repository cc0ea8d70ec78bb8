use crate::auth::jwt::JwtConfig;

/// Feature flags gating optional route groups.
///
/// A disabled feature's routes are not mounted, so requests get a 404.
#[derive(Debug, Clone, Copy)]
pub struct FeatureFlags {
    pub consults: bool,
    pub reschedule: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            consults: true,
            reschedule: true,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// JWT secret.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Frontend base URL, used for redirects and links in emails.
    pub app_url: String,
    /// Public base URL of this API, used for links that must hit the API.
    pub api_url: String,
    pub jwt: JwtConfig,
    pub features: FeatureFlags,
    pub reminder_interval_secs: u64,
    pub token_cleanup_interval_secs: u64,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                       |
    /// | `APP_URL`                     | `http://localhost:5173`    |
    /// | `API_URL`                     | `http://localhost:3000`    |
    /// | `ENABLE_CONSULTS`             | `true`                     |
    /// | `ENABLE_RESCHEDULE`           | `true`                     |
    /// | `REMINDER_INTERVAL_SECS`      | `600`                      |
    /// | `TOKEN_CLEANUP_INTERVAL_SECS` | `3600`                     |
    ///
    /// # Panics
    ///
    /// Panics on unparseable numbers and when `JWT_SECRET` is missing.
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", "30")
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let reminder_interval_secs: u64 = env_or("REMINDER_INTERVAL_SECS", "600")
            .parse()
            .expect("REMINDER_INTERVAL_SECS must be a valid u64");

        let token_cleanup_interval_secs: u64 = env_or("TOKEN_CLEANUP_INTERVAL_SECS", "3600")
            .parse()
            .expect("TOKEN_CLEANUP_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            app_url: env_or("APP_URL", "http://localhost:5173")
                .trim_end_matches('/')
                .to_string(),
            api_url: env_or("API_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            jwt: JwtConfig::from_env(),
            features: FeatureFlags {
                consults: env_flag("ENABLE_CONSULTS", true),
                reschedule: env_flag("ENABLE_RESCHEDULE", true),
            },
            reminder_interval_secs,
            token_cleanup_interval_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_flag_parsing() {
        std::env::set_var("TUTORHUB_TEST_FLAG_ON", "Yes");
        std::env::set_var("TUTORHUB_TEST_FLAG_OFF", "false");
        assert!(env_flag("TUTORHUB_TEST_FLAG_ON", false));
        assert!(!env_flag("TUTORHUB_TEST_FLAG_OFF", true));
        assert!(env_flag("TUTORHUB_TEST_FLAG_MISSING", true));
    }
}
