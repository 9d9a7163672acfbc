//! Client configuration loaded from environment variables.
//!
//! The backend host and the access-token lifetime hint are deployment
//! concerns, so they are read from the environment (a `.env` file is
//! honored if present) rather than hard-coded.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Environment variable naming the backend base URL, e.g. `https://api.watchb.example`.
const BACKEND_HOST_VAR: &str = "WATCHB_BACKEND_HOST";

/// Environment variable overriding the access-token lifetime hint, in milliseconds.
const TOKEN_LIFETIME_VAR: &str = "WATCHB_ACCESS_TOKEN_LIFETIME_MS";

/// Default access-token lifetime when the server does not advertise one.
/// Matches the backend's five-minute access token setting.
const DEFAULT_TOKEN_LIFETIME_MS: u64 = 5 * 60 * 1000;

/// How long before expected expiry the proactive refresh fires.
/// 60 seconds leaves room for a slow refresh round-trip.
const REFRESH_MARGIN_MS: u64 = 60 * 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for all API requests
    pub backend_host: String,
    /// Expected access-token lifetime, used to schedule proactive refresh
    pub access_token_lifetime: Duration,
    /// Margin subtracted from the lifetime when scheduling refresh
    pub refresh_margin: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            backend_host: "http://localhost:8000".to_string(),
            access_token_lifetime: Duration::from_millis(DEFAULT_TOKEN_LIFETIME_MS),
            refresh_margin: Duration::from_millis(REFRESH_MARGIN_MS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend_host = env::var(BACKEND_HOST_VAR)
            .map(|v| v.trim_end_matches('/').to_string())
            .map_err(|_| ConfigError::Missing(BACKEND_HOST_VAR))?;

        let lifetime_ms = match env::var(TOKEN_LIFETIME_VAR) {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid(TOKEN_LIFETIME_VAR, raw))?,
            Err(_) => DEFAULT_TOKEN_LIFETIME_MS,
        };

        Ok(Self {
            backend_host,
            access_token_lifetime: Duration::from_millis(lifetime_ms),
            refresh_margin: Duration::from_millis(REFRESH_MARGIN_MS),
        })
    }

    /// Delay until the proactive refresh should fire after a token grant.
    /// Saturates to zero for pathologically short lifetimes.
    pub fn refresh_delay(&self) -> Duration {
        self.access_token_lifetime
            .saturating_sub(self.refresh_margin)
    }
}
