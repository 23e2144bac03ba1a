//! Client configuration

use std::time::Duration;

use reqwest::Url;

use crate::cache::{ReadPolicy, DEFAULT_TTL};
use crate::data::Language;
use crate::error::{GarlandError, Result};

/// Host serving the database documents and assets
pub const DEFAULT_BASE_URL: &str = "https://www.garlandtools.org";

/// Timeout applied to every HTTP request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a `GarlandClient`
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Scheme and host of the remote service, without a trailing slash
    pub base_url: String,
    /// Language embedded in request paths
    pub language: Language,
    /// How long fetched payloads stay in the cache
    pub cache_time: Duration,
    /// HTTP request timeout; a timed-out request is a fetch error
    pub timeout: Duration,
    /// User-Agent header sent with each request
    pub user_agent: String,
    /// Whether reads check entry age or rely on the sweep alone
    pub read_policy: ReadPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: Language::default(),
            cache_time: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("garlandtools-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            read_policy: ReadPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_cache_time(mut self, cache_time: Duration) -> Self {
        self.cache_time = cache_time;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_read_policy(mut self, read_policy: ReadPolicy) -> Self {
        self.read_policy = read_policy;
        self
    }

    /// Checks every field, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.cache_time.is_zero() {
            return Err(GarlandError::InvalidConfig(
                "cache time must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(GarlandError::InvalidConfig(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        let url = Url::parse(&self.base_url).map_err(|e| {
            GarlandError::InvalidConfig(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GarlandError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed
    pub(crate) fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }
}
