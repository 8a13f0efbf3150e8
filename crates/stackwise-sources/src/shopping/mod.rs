//! HTTP client for SerpApi's Google Shopping engine.

mod types;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Url};

use crate::error::SourceError;
use crate::options::{parse_base_url, retry_after_secs, ClientOptions};
use crate::retry::retry_with_backoff;
use crate::source::PriceSource;
use types::{ShoppingSearchResponse, NO_RESULTS_MARKER};

pub use types::RawOfferRecord;

const DEFAULT_BASE_URL: &str = "https://serpapi.com/";
const PROVIDER: &str = "serpapi";

/// Client for location-aware shopping searches across all stores.
///
/// Use [`ShoppingClient::new`] for production or
/// [`ShoppingClient::with_base_url`] to point at a mock server in tests.
pub struct ShoppingClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    country: String,
    language: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl ShoppingClient {
    /// Creates a client pointed at the production SerpApi endpoint.
    ///
    /// A missing `api_key` is accepted here; every search then fails with
    /// [`SourceError::MissingCredential`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: Option<String>, options: &ClientOptions) -> Result<Self, SourceError> {
        Self::with_base_url(api_key, options, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the client cannot be constructed, or
    /// [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: Option<String>,
        options: &ClientOptions,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: options.build_client()?,
            api_key,
            base_url: parse_base_url(base_url)?,
            country: "us".to_owned(),
            language: "en".to_owned(),
            max_retries: options.max_retries,
            backoff_base_secs: options.backoff_base_secs,
        })
    }

    /// Sets the `gl` (country) and `hl` (language) search parameters.
    #[must_use]
    pub fn with_locale(mut self, country: &str, language: &str) -> Self {
        country.clone_into(&mut self.country);
        language.clone_into(&mut self.language);
        self
    }

    /// Searches shopping listings for `item` near `location`.
    ///
    /// Results from `inline_shopping_results` come first, then
    /// `shopping_results`, each in provider order. Duplicates are kept.
    ///
    /// # Errors
    ///
    /// - [`SourceError::MissingCredential`] if no API key is configured (no I/O).
    /// - [`SourceError::RateLimited`] on HTTP 429 after all retries.
    /// - [`SourceError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`SourceError::Api`] if SerpApi reports an error in the body.
    /// - [`SourceError::Deserialize`] if the body is not the expected JSON.
    /// - [`SourceError::Http`] on network failure after all retries.
    pub async fn search(
        &self,
        item: &str,
        location: &str,
        limit: u32,
    ) -> Result<Vec<RawOfferRecord>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredential("SERPAPI_KEY"))?;
        let url = self.search_url(api_key, item, location, limit)?;

        let response = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move { self.request_search(url, item).await }
        })
        .await?;

        if let Some(message) = response.error {
            let no_results = response.inline_shopping_results.is_empty()
                && response.shopping_results.is_empty();
            if no_results && message.contains(NO_RESULTS_MARKER) {
                tracing::debug!(item, location, "shopping search returned no results");
                return Ok(Vec::new());
            }
            if no_results {
                return Err(SourceError::Api {
                    provider: PROVIDER,
                    message,
                });
            }
        }

        let records: Vec<RawOfferRecord> = response
            .inline_shopping_results
            .iter()
            .chain(response.shopping_results.iter())
            .map(RawOfferRecord::from_value)
            .collect();

        tracing::debug!(item, location, count = records.len(), "shopping search complete");
        Ok(records)
    }

    async fn request_search(
        &self,
        url: Url,
        item: &str,
    ) -> Result<ShoppingSearchResponse, SourceError> {
        let endpoint = url.path().to_owned();
        let response = self.client.get(url).send().await?;
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
        serde_json::from_str::<ShoppingSearchResponse>(&body).map_err(|e| {
            SourceError::Deserialize {
                context: format!("shopping search for '{item}'"),
                source: e,
            }
        })
    }

    /// Builds the `search.json` URL with every query parameter SerpApi needs.
    fn search_url(
        &self,
        api_key: &str,
        item: &str,
        location: &str,
        limit: u32,
    ) -> Result<Url, SourceError> {
        let mut url = self
            .base_url
            .join("search.json")
            .map_err(|e| SourceError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        url.query_pairs_mut()
            .append_pair("engine", "google_shopping")
            .append_pair("q", item)
            .append_pair("api_key", api_key)
            .append_pair("gl", &self.country)
            .append_pair("hl", &self.language)
            .append_pair("location", location)
            .append_pair("num", &limit.to_string());

        Ok(url)
    }
}

impl PriceSource for ShoppingClient {
    fn search<'a>(
        &'a self,
        item: &'a str,
        location: &'a str,
        limit: u32,
    ) -> BoxFuture<'a, Result<Vec<RawOfferRecord>, SourceError>> {
        ShoppingClient::search(self, item, location, limit).boxed()
    }
}
