use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Forum endpoints
    pub api_base_url: String,
    pub site_base_url: String,
    pub conversation_id: u64,
    pub page_size: u64,

    // State file
    pub state_path: PathBuf,
    pub seed_last_post_id: u64,
    pub seed_offset: u64,

    // HTTP behavior
    pub user_agent: String,
    pub request_timeout: Duration,

    // Publish credential (access_token cookie on the forum site)
    pub access_token: Option<String>,

    // Pushover notifications
    pub notify_api_url: String,
    pub pushover_user: Option<String>,
    pub pushover_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Forum endpoints
            api_base_url: env_or_default("API_BASE_URL", "https://lfgss.microco.sm"),
            site_base_url: env_or_default("SITE_BASE_URL", "https://www.lfgss.com"),
            conversation_id: parse_env_u64("CONVERSATION_ID", 282_005)?,
            page_size: parse_env_u64("PAGE_SIZE", 100)?,

            // State file
            state_path: PathBuf::from(env_or_default("STATE_PATH", "./data/theme-state.json")),
            seed_last_post_id: parse_env_u64("SEED_LAST_POST_ID", 0)?,
            seed_offset: parse_env_u64("SEED_OFFSET", 0)?,

            // HTTP behavior
            user_agent: env_or_default("USER_AGENT", "theme-digest-bot/0.1"),
            request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 30)?),

            // Credentials
            access_token: optional_env("ACCESS_TOKEN"),
            notify_api_url: env_or_default("NOTIFY_API_URL", "https://api.pushover.net"),
            pushover_user: optional_env("PUSHOVER_USER"),
            pushover_token: optional_env("PUSHOVER_TOKEN"),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "PAGE_SIZE".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        for (name, value) in [
            ("API_BASE_URL", &self.api_base_url),
            ("SITE_BASE_URL", &self.site_base_url),
            ("NOTIFY_API_URL", &self.notify_api_url),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: format!("not a valid URL: '{value}'"),
                });
            }
        }
        Ok(())
    }

    /// Validate that publishing can be attempted with this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no publish credential is configured.
    pub fn validate_for_publish(&self) -> Result<(), ConfigError> {
        if self.access_token.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingEnvVar("ACCESS_TOKEN".to_string()));
        }
        Ok(())
    }

    /// Whether notification credentials are configured.
    #[must_use]
    pub fn notifications_configured(&self) -> bool {
        matches!(
            (self.pushover_user.as_deref(), self.pushover_token.as_deref()),
            (Some(u), Some(t)) if !u.is_empty() && !t.is_empty()
        )
    }

    /// Baseline configuration for tests; individual fields are overridden
    /// with struct update syntax.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:0".to_string(),
            site_base_url: "http://127.0.0.1:0".to_string(),
            conversation_id: 282_005,
            page_size: 100,
            state_path: PathBuf::from("./theme-state.json"),
            seed_last_post_id: 0,
            seed_offset: 0,
            user_agent: "theme-digest-bot/test".to_string(),
            request_timeout: Duration::from_secs(10),
            access_token: Some("test-token".to_string()),
            notify_api_url: "http://127.0.0.1:0".to_string(),
            pushover_user: Some("test-user".to_string()),
            pushover_token: Some("test-app".to_string()),
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
