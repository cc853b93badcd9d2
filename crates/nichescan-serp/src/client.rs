//! HTTP client for the ValueSERP `/search` endpoint.

use std::time::Duration;

use nichescan_core::{AppConfig, CountryLocale};
use reqwest::{Client, Url};

use crate::error::SerpError;
use crate::retry::retry_with_backoff;
use crate::types::SerpResponse;

const DEFAULT_BASE_URL: &str = "https://api.valueserp.com";

/// Client for the ValueSERP search API.
///
/// Use [`SerpClient::new`] for production or [`SerpClient::with_base_url`] to
/// point at a mock server in tests. Transient failures (network, 429, 5xx) are
/// retried with exponential backoff.
pub struct SerpClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_secs: u64,
    max_page: u32,
}

impl SerpClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`SerpError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, SerpError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SerpError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`SerpError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SerpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("nichescan/0.1 (market-research)")
            .build()?;

        let normalised = format!("{}/search", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SerpError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
            max_retries: 2,
            backoff_base_secs: 1,
            max_page: 2,
        })
    }

    /// Builds a client from application config.
    ///
    /// # Errors
    ///
    /// Returns [`SerpError::MissingApiKey`] when `VALUESERP_API_KEY` is unset,
    /// plus any error from [`SerpClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SerpError> {
        let api_key = config
            .serp_api_key
            .as_deref()
            .ok_or(SerpError::MissingApiKey)?;
        Ok(
            Self::with_base_url(api_key, config.serp_timeout_secs, &config.serp_base_url)?
                .with_retry(config.serp_max_retries, config.serp_backoff_base_secs)
                .with_max_page(config.serp_max_page),
        )
    }

    /// Overrides the retry policy. `max_retries = 0` disables retries.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_secs: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_secs = backoff_base_secs;
        self
    }

    /// Number of result pages the provider merges into one response.
    #[must_use]
    pub fn with_max_page(mut self, max_page: u32) -> Self {
        self.max_page = max_page.max(1);
        self
    }

    /// Runs one search for `keyword` in the given locale.
    ///
    /// # Errors
    ///
    /// - [`SerpError::RateLimited`] / [`SerpError::UnexpectedStatus`] for
    ///   non-2xx responses (5xx and 429 only after retries are exhausted).
    /// - [`SerpError::Http`] on network failure after retries.
    /// - [`SerpError::Deserialize`] if the body is not a JSON object.
    /// - [`SerpError::ApiError`] if the payload reports `success: false`.
    pub async fn search(
        &self,
        keyword: &str,
        locale: &CountryLocale,
    ) -> Result<SerpResponse, SerpError> {
        let url = self.build_url(keyword, locale);
        let context = format!("search(q={keyword}, gl={})", locale.gl);

        tracing::debug!(keyword, gl = locale.gl, "fetching search results");

        let response = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let context = context.clone();
            async move {
                let response = self.client.get(url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(0);
                    return Err(SerpError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(SerpError::UnexpectedStatus {
                        status: status.as_u16(),
                        context,
                    });
                }

                let body = response.text().await?;
                SerpResponse::from_json(&body)
                    .map_err(|e| SerpError::Deserialize { context, source: e })
            }
        })
        .await?;

        if response.is_failure() {
            let message = response
                .request_info
                .as_ref()
                .and_then(|info| info.message.clone())
                .unwrap_or_else(|| "request was not successful".to_owned());
            return Err(SerpError::ApiError(message));
        }

        tracing::debug!(
            keyword,
            organic = response.organic_results.len(),
            discussions = response.discussions_and_forums.len(),
            "search results received"
        );

        Ok(response)
    }

    fn build_url(&self, keyword: &str, locale: &CountryLocale) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            pairs.append_pair("q", keyword);
            pairs.append_pair("gl", locale.gl);
            // Results are always requested in English; the locale only picks
            // the market.
            pairs.append_pair("hl", "en");
            pairs.append_pair("google_domain", locale.google_domain);
            pairs.append_pair("include_answer_box", "true");
            pairs.append_pair("include_ai_overview", "true");
            pairs.append_pair("include_videos", "true");
            pairs.append_pair("max_page", &self.max_page.to_string());
        }
        url
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
