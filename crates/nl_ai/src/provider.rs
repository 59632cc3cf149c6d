use std::time::Duration;

use nl_core::error::AppError;

use crate::config::{AnalyzerConfig, DEFAULT_TIMEOUT_SECS};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct ProviderClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ProviderClient {
    /// Client for the hosted model API.
    ///
    /// Only `https://host[:port]` is accepted, plus plain `http://127.0.0.1[:port]` for a local
    /// emulator. Paths, credentials in the authority and other hosts over plain http are
    /// rejected.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        let base_url = validate_base_url(base_url)?;
        if api_key.trim().is_empty() {
            return Err(AppError::new("AI_CONFIG_INVALID", "API key is required"));
        }
        Ok(Self {
            base_url,
            api_key: api_key.trim().to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AppError> {
        Ok(Self::new(&config.base_url, &config.api_key)?.with_timeout(config.timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}", self.base_url, model)
    }

    pub fn health_check(&self, model: &str) -> Result<(), AppError> {
        let resp = ureq::get(&self.model_url(model))
            .set("x-goog-api-key", &self.api_key)
            .timeout(HEALTH_TIMEOUT)
            .call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new("AI_PROVIDER_UNHEALTHY", "Analysis provider health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(ureq::Error::Status(code, _)) => Err(AppError::new(
                "AI_PROVIDER_REJECTED",
                "Analysis provider rejected the health check",
            )
            .with_details(format!("status={code}"))),
            Err(e) => Err(AppError::new(
                "AI_TRANSPORT_FAILED",
                "Failed to reach analysis provider",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}

fn validate_base_url(raw: &str) -> Result<String, AppError> {
    let base_url = raw.trim().trim_end_matches('/').to_string();
    let reject = |reason: &str| {
        AppError::new(
            "AI_REMOTE_NOT_ALLOWED",
            "Provider base URL must be https, or http on 127.0.0.1",
        )
        .with_details(format!("base_url={base_url}; reason={reason}"))
    };

    let Some((scheme, authority)) = base_url.split_once("://") else {
        return Err(reject("missing scheme"));
    };
    if authority.is_empty() {
        return Err(reject("missing host"));
    }
    if authority.contains(['/', '@', '?', '#']) {
        return Err(reject("path, query or credentials not allowed"));
    }

    let (host, port) = match authority.rsplit_once(':') {
        Some((h, p)) => (h, Some(p)),
        None => (authority, None),
    };
    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(reject("invalid host"));
    }
    if let Some(p) = port {
        match p.parse::<u16>() {
            Ok(n) if n > 0 => {}
            _ => return Err(reject("invalid port")),
        }
    }

    let allowed = scheme == "https" || (scheme == "http" && host == "127.0.0.1");
    if !allowed {
        return Err(reject("scheme not allowed for host"));
    }
    Ok(base_url)
}
