use std::path::PathBuf;

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
    pub log_level: String,
    /// SerpApi key for the shopping search. Absence is only fatal once a
    /// search is attempted.
    pub serpapi_api_key: Option<String>,
    /// CouponAPI key. When absent the coupon feed yields nothing.
    pub couponapi_api_key: Option<String>,
    pub catalog_path: PathBuf,
    pub profile_path: PathBuf,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Upper bound for a single discount-source lookup.
    pub source_timeout_ms: u64,
    pub max_concurrent_offers: usize,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub search_country: String,
    pub search_language: String,
    pub coupon_lookback_days: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "serpapi_api_key",
                &self.serpapi_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "couponapi_api_key",
                &self.couponapi_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("catalog_path", &self.catalog_path)
            .field("profile_path", &self.profile_path)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("source_timeout_ms", &self.source_timeout_ms)
            .field("max_concurrent_offers", &self.max_concurrent_offers)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("search_country", &self.search_country)
            .field("search_language", &self.search_language)
            .field("coupon_lookback_days", &self.coupon_lookback_days)
            .finish()
    }
}
