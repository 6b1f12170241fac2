use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Private API key for the event/profile store. Required: no query can
    /// proceed without it.
    pub events_api_key: String,
    /// Override for the event store base URL (wiremock in tests).
    pub events_base_url: Option<String>,
    /// Commerce shop domain, e.g. `example.myshopify.com`. Optional: absent
    /// credentials degrade enrichment to unknown rather than failing the run.
    pub commerce_domain: Option<String>,
    pub commerce_token: Option<String>,
    /// Override for the commerce base URL (wiremock in tests); takes
    /// precedence over the domain-derived URL.
    pub commerce_base_url: Option<String>,
    pub list_name: String,
    pub signup_metric: String,
    pub alert_metric: String,
    pub message_metric: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("events_api_key", &"[redacted]")
            .field("events_base_url", &self.events_base_url)
            .field("commerce_domain", &self.commerce_domain)
            .field(
                "commerce_token",
                &self.commerce_token.as_ref().map(|_| "[redacted]"),
            )
            .field("commerce_base_url", &self.commerce_base_url)
            .field("list_name", &self.list_name)
            .field("signup_metric", &self.signup_metric)
            .field("alert_metric", &self.alert_metric)
            .field("message_metric", &self.message_metric)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}
