//! Runtime configuration, read from the environment at startup.

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_APP_TITLE: &str = "AI Script Generator";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings for the outbound completion call.
#[derive(Clone)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub site_origin: String,
    pub app_title: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("site_origin", &self.site_origin)
            .field("app_title", &self.app_title)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            site_origin: "http://localhost:8080".to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub email_header: String,
    pub sign_in_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { email_header: "x-forwarded-email".to_string(), sign_in_path: "/auth".to_string() }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub demo_mode: bool,
    pub completion: CompletionConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = CompletionConfig::default();
        let auth_defaults = AuthConfig::default();

        let port = parse_or(get("PORT"), "PORT", 8080u16)?;
        let timeout_secs = parse_or(get("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", 60u64)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".into(), "must be greater than zero".into()));
        }

        let demo_mode = match get("DEMO_MODE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("0") | Some("false") | Some("off") | Some("no") => false,
            Some("1") | Some("true") | Some("on") | Some("yes") => true,
            Some(other) => return Err(ConfigError::InvalidValue("DEMO_MODE".into(), other.to_string())),
        };

        let completion = CompletionConfig {
            api_key: get("OPENROUTER_API_KEY"),
            base_url: get("OPENROUTER_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: get("OPENROUTER_MODEL").unwrap_or(defaults.model),
            site_origin: get("SITE_ORIGIN").unwrap_or(defaults.site_origin),
            app_title: get("APP_TITLE").unwrap_or(defaults.app_title),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: defaults.connect_timeout,
        };

        let auth = AuthConfig {
            email_header: get("AUTH_EMAIL_HEADER").map(|h| h.to_ascii_lowercase()).unwrap_or(auth_defaults.email_header),
            sign_in_path: get("AUTH_SIGN_IN_PATH").unwrap_or(auth_defaults.sign_in_path),
        };

        Ok(Self { port, demo_mode, completion, auth })
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue(key.to_string(), v)),
        None => Ok(default),
    }
}
