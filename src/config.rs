use std::time::Duration;

use crate::utils::RetryConfig;

// ============================================================================
// Order Service Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct OrderServiceConfig {
    /// Base URL of the REST backend, e.g. `https://shop.example.com/api`
    pub base_url: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Per-request timeout applied by the HTTP client
    pub request_timeout: Duration,
    /// Retry policy for reads; writes are never retried
    pub read_retry: RetryConfig,
}

impl OrderServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            request_timeout: Duration::from_secs(10),
            read_retry: RetryConfig::default(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_read_retry(mut self, retry: RetryConfig) -> Self {
        self.read_retry = retry;
        self
    }

    pub(crate) fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
