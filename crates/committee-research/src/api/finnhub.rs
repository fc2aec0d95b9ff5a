//! Finnhub company news client

use super::{NewsItem, NewsSearch};
use crate::error::{ResearchError, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const BASE_URL: &str = "https://finnhub.io/api/v1";

const DEFAULT_RATE_LIMIT: NonZeroU32 = match NonZeroU32::new(60) {
    Some(rate) => rate,
    None => panic!("rate limit must be non-zero"),
};

/// Days of company news requested
const NEWS_WINDOW_DAYS: i64 = 7;

/// Finnhub news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinnhubNewsArticle {
    /// Article category
    #[serde(default)]
    pub category: String,
    /// Publish time (UNIX timestamp)
    pub datetime: i64,
    /// News headline
    pub headline: String,
    /// Related symbols
    #[serde(default)]
    pub related: String,
    /// News source
    #[serde(default)]
    pub source: String,
    /// Article summary
    #[serde(default)]
    pub summary: String,
    /// Article URL
    #[serde(default)]
    pub url: String,
}

/// Finnhub client for company news
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client with rate limiting
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `rate_limit` - Requests per minute (free tier: 60, premium: 300+)
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_key: impl Into<String>,
        rate_limit: u32,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let per_minute = NonZeroU32::new(rate_limit).unwrap_or(DEFAULT_RATE_LIMIT);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            rate_limiter,
        })
    }

    /// Point requests at another API base
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get company news for a specific symbol
    ///
    /// # Arguments
    /// * `symbol` - Stock symbol (e.g., "AAPL")
    /// * `from` - Start date (YYYY-MM-DD)
    /// * `to` - End date (YYYY-MM-DD)
    pub async fn get_company_news(
        &self,
        symbol: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<FinnhubNewsArticle>> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(format!("{}/company-news", self.base_url))
            .query(&[
                ("symbol", symbol),
                ("from", from),
                ("to", to),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ResearchError::NewsSearch(format!("Finnhub request failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ResearchError::RateLimited {
                provider: "finnhub".to_string(),
            });
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ResearchError::Configuration(
                "Finnhub rejected the API key".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResearchError::NewsSearch(format!(
                "Finnhub API error {status}: {body}"
            )));
        }

        response
            .json::<Vec<FinnhubNewsArticle>>()
            .await
            .map_err(|e| ResearchError::NewsSearch(format!("Failed to parse Finnhub response: {e}")))
    }
}

#[async_trait]
impl NewsSearch for FinnhubClient {
    #[instrument(skip(self, _query))]
    async fn search(&self, symbol: &str, _query: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        let to = Utc::now().date_naive();
        let from = to - Duration::days(NEWS_WINDOW_DAYS);

        let articles = self
            .get_company_news(symbol, &from.to_string(), &to.to_string())
            .await?;
        debug!(articles = articles.len(), "Finnhub company news fetched");

        Ok(articles
            .into_iter()
            .filter(|article| !article.headline.trim().is_empty())
            .take(max_results)
            .map(|article| NewsItem {
                title: article.headline.trim().to_string(),
                body: article.summary.trim().to_string(),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "finnhub"
    }
}
