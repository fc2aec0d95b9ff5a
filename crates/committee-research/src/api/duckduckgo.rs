//! DuckDuckGo HTML search client

use super::{NewsItem, NewsSearch};
use crate::error::{ResearchError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument};

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) equity-committee/0.1";

/// Web search through DuckDuckGo's HTML endpoint
///
/// No API key is needed. The endpoint answers throttled clients with
/// HTTP 202 and an empty result page, which is reported as a rate limit.
pub struct DuckDuckGoClient {
    client: Client,
    search_url: String,
    result_re: Regex,
    tag_re: Regex,
}

impl DuckDuckGoClient {
    /// Create a new DuckDuckGo client
    pub fn new(timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        // Title anchor followed by its snippet; the opening tag is captured to
        // recognise sponsored links
        let result_re = Regex::new(
            r#"(?s)(<a[^>]*class="result__a"[^>]*>)(.*?)</a>.*?class="result__snippet"[^>]*>(.*?)</(?:a|td|div)>"#,
        )
        .map_err(|e| ResearchError::NewsSearch(e.to_string()))?;
        let tag_re =
            Regex::new(r"<[^>]+>").map_err(|e| ResearchError::NewsSearch(e.to_string()))?;

        Ok(Self {
            client,
            search_url: SEARCH_URL.to_string(),
            result_re,
            tag_re,
        })
    }

    /// Point searches at another endpoint
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Extract organic results from a result page
    pub fn parse_results(&self, html: &str, max_results: usize) -> Vec<NewsItem> {
        self.result_re
            .captures_iter(html)
            .filter(|cap| !cap[1].contains("/y.js"))
            .map(|cap| NewsItem {
                title: self.plain_text(&cap[2]),
                body: self.plain_text(&cap[3]),
            })
            .filter(|item| !item.title.is_empty())
            .take(max_results)
            .collect()
    }

    fn plain_text(&self, fragment: &str) -> String {
        let stripped = self.tag_re.replace_all(fragment, "");
        let decoded = decode_entities(&stripped);
        decoded.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[async_trait]
impl NewsSearch for DuckDuckGoClient {
    #[instrument(skip(self, _symbol))]
    async fn search(&self, _symbol: &str, query: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        let response = self
            .client
            .post(&self.search_url)
            .form(&[("q", query), ("b", ""), ("kl", "wt-wt")])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 202 || status.as_u16() == 429 {
            return Err(ResearchError::RateLimited {
                provider: "duckduckgo".to_string(),
            });
        }
        if !status.is_success() {
            return Err(ResearchError::NewsSearch(format!(
                "DuckDuckGo returned {status}"
            )));
        }

        let html = response.text().await?;
        let items = self.parse_results(&html, max_results);
        debug!(results = items.len(), "DuckDuckGo search complete");
        Ok(items)
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
