//! CouponAPI.org incremental coupon feed.
//!
//! The feed is not searchable by store, so the client downloads it once (all
//! offers changed within the lookback window) and filters it per store on
//! every lookup.
//!
//! The download runs in its own task and its outcome is shared by every
//! lookup, so a caller that stops waiting (for example on a timeout) does not
//! abort it. A failed download is logged once and disables the feed for the
//! lifetime of the client.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use stackwise_core::FeedDeal;

use crate::error::SourceError;
use crate::options::{parse_base_url, retry_after_secs, ClientOptions};
use crate::retry::retry_with_backoff;
use crate::source::DealFeed;

const DEFAULT_BASE_URL: &str = "https://couponapi.org/api/";
const PROVIDER: &str = "couponapi";

/// `None` once the download has failed.
type FeedOutcome = Option<Arc<Vec<CouponOffer>>>;
type SharedFeed = Shared<BoxFuture<'static, FeedOutcome>>;

#[derive(Debug, Deserialize)]
struct FeedResponse {
    /// `true` (or `1`) on success.
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Value,
    #[serde(default)]
    offers: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CouponOffer {
    store: Option<String>,
    title: Option<String>,
    description: Option<String>,
    code: Option<String>,
    affiliate_link: Option<String>,
    url: Option<String>,
    end_date: Option<String>,
}

impl CouponOffer {
    /// Strings are trimmed and numbers (e.g. a numeric `code`) are rendered
    /// as text. Anything else counts as absent.
    fn from_value(value: &Value) -> Self {
        let text = |key: &str| match value.get(key) {
            Some(Value::String(s)) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Self {
            store: text("store"),
            title: text("title"),
            description: text("description"),
            code: text("code"),
            affiliate_link: text("affiliate_link"),
            url: text("url"),
            end_date: text("end_date"),
        }
    }

    fn matches_store(&self, needle: &str) -> bool {
        self.store
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
    }

    fn to_feed_deal(&self) -> Option<FeedDeal> {
        Some(FeedDeal {
            title: self.title.clone()?,
            code: self.code.clone(),
            link: self.affiliate_link.clone().or_else(|| self.url.clone()),
            description: self.description.clone(),
            ends_at: self.end_date.clone(),
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.as_str(), "true" | "1"),
        _ => false,
    }
}

/// Everything the background download needs, owned so it can outlive the
/// lookup that started it.
struct FeedDownload {
    client: Client,
    url: Url,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl FeedDownload {
    async fn run(self) -> FeedOutcome {
        match self.fetch().await {
            Ok(offers) => {
                tracing::debug!(source = PROVIDER, count = offers.len(), "coupon feed downloaded");
                Some(Arc::new(offers))
            }
            Err(e) => {
                tracing::warn!(
                    source = PROVIDER,
                    error = %e,
                    "coupon feed download failed, feed disabled for this run"
                );
                None
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<CouponOffer>, SourceError> {
        let response = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.request_feed()
        })
        .await?;

        if !is_truthy(&response.result) {
            return Err(SourceError::Api {
                provider: PROVIDER,
                message: response
                    .error
                    .as_str()
                    .unwrap_or("feed request unsuccessful")
                    .to_owned(),
            });
        }

        Ok(response.offers.iter().map(CouponOffer::from_value).collect())
    }

    async fn request_feed(&self) -> Result<FeedResponse, SourceError> {
        let endpoint = self.url.path().to_owned();
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited {
                provider: PROVIDER,
                retry_after_secs: retry_after_secs(&response),
            });
        }

        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                provider: PROVIDER,
                status: status.as_u16(),
                endpoint,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<FeedResponse>(&body).map_err(|e| SourceError::Deserialize {
            context: "coupon incremental feed".to_owned(),
            source: e,
        })
    }
}

/// Coupon feed client. Without an API key every lookup returns an empty list
/// and no request is made.
pub struct CouponApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    lookback_days: u32,
    max_retries: u32,
    backoff_base_secs: u64,
    feed: OnceLock<SharedFeed>,
}

impl CouponApiClient {
    /// Creates a client pointed at the production CouponAPI endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<String>,
        lookback_days: u32,
        options: &ClientOptions,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(api_key, lookback_days, options, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the client cannot be constructed, or
    /// [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: Option<String>,
        lookback_days: u32,
        options: &ClientOptions,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: options.build_client()?,
            api_key,
            base_url: parse_base_url(base_url)?,
            lookback_days,
            max_retries: options.max_retries,
            backoff_base_secs: options.backoff_base_secs,
            feed: OnceLock::new(),
        })
    }

    /// Starts the feed download in the background if it has not started yet.
    /// Does nothing without an API key.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_download(&self) {
        let _ = self.shared_feed();
    }

    /// Coupons whose store name contains `store`, case-insensitively.
    ///
    /// The first call starts the download; every call waits for the same
    /// download. After a failed download this returns an empty list.
    pub async fn coupons_for_store(&self, store: &str) -> Vec<FeedDeal> {
        let needle = store.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let Some(feed) = self.shared_feed() else {
            return Vec::new();
        };
        let Some(offers) = feed.await else {
            return Vec::new();
        };

        offers
            .iter()
            .filter(|offer| offer.matches_store(&needle))
            .filter_map(CouponOffer::to_feed_deal)
            .collect()
    }

    fn shared_feed(&self) -> Option<SharedFeed> {
        let api_key = self.api_key.as_deref()?;
        let feed = self.feed.get_or_init(|| match self.feed_url(api_key) {
            Ok(url) => {
                let download = FeedDownload {
                    client: self.client.clone(),
                    url,
                    max_retries: self.max_retries,
                    backoff_base_secs: self.backoff_base_secs,
                };
                let task = tokio::spawn(download.run());
                async move {
                    task.await.unwrap_or_else(|e| {
                        tracing::warn!(source = PROVIDER, error = %e, "coupon feed task failed");
                        None
                    })
                }
                .boxed()
                .shared()
            }
            Err(e) => {
                tracing::warn!(source = PROVIDER, error = %e, "coupon feed URL is invalid");
                future::ready(None).boxed().shared()
            }
        });
        Some(feed.clone())
    }

    fn feed_url(&self, api_key: &str) -> Result<Url, SourceError> {
        let last_extract = Utc::now().timestamp() - i64::from(self.lookback_days) * 24 * 60 * 60;
        let mut url = self
            .base_url
            .join("getIncrementalFeed/")
            .map_err(|e| SourceError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        url.query_pairs_mut()
            .append_pair("API_KEY", api_key)
            .append_pair("last_extract", &last_extract.to_string())
            .append_pair("format", "json");

        Ok(url)
    }
}

impl DealFeed for CouponApiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn prefetch(&self) {
        self.start_download();
    }

    fn deals_for_store<'a>(
        &'a self,
        store: &'a str,
    ) -> BoxFuture<'a, Result<Vec<FeedDeal>, SourceError>> {
        self.coupons_for_store(store).map(Ok).boxed()
    }
}
