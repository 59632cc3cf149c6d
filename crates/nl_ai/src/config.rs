use std::fmt;
use std::time::Duration;

use nl_core::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_BASE_URL: &str = "NL_AI_BASE_URL";
pub const ENV_MODEL: &str = "NL_AI_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "NL_AI_TIMEOUT_SECS";

/// Settings for the hosted model. `api_key` is required; everything else has a default.
#[derive(Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl AnalyzerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank(ENV_API_KEY).ok_or_else(|| {
            AppError::new("AI_CONFIG_INVALID", "API_KEY environment variable not set")
        })?;

        let timeout = match non_blank(ENV_TIMEOUT_SECS) {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(AppError::new(
                        "AI_CONFIG_INVALID",
                        "Request timeout must be a positive number of seconds",
                    )
                    .with_details(format!("{ENV_TIMEOUT_SECS}={raw}")))
                }
            },
        };

        Ok(Self {
            base_url: non_blank(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: api_key.trim().to_string(),
            model: non_blank(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout,
        })
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
