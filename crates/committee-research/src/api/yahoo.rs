//! Yahoo Finance API client

use super::{CompanyProfile, MarketDataProvider, Quote};
use crate::error::{ResearchError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) equity-committee/0.1";

/// Yahoo Finance API client
///
/// Quotes come from `yahoo_finance_api`; the company profile comes from the
/// public search endpoint, which carries name, sector, industry and exchange
/// without the cookie handshake the quote-summary endpoint needs.
#[derive(Clone)]
pub struct YahooFinanceClient {
    http: Client,
    search_url: String,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(timeout: std::time::Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            search_url: SEARCH_URL.to_string(),
        })
    }

    /// Point profile lookups at another search endpoint
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| ResearchError::MarketData(e.to_string()))
    }

    /// Get the latest daily quote for a symbol
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let response = Self::connector()?
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| classify(symbol, e))?;

        let quote = response.last_quote().map_err(|e| classify(symbol, e))?;

        Ok(convert_quote(symbol, &quote))
    }

    /// Get historical quotes between two instants
    pub async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| ResearchError::MarketData(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| ResearchError::MarketData(format!("Invalid end timestamp: {e}")))?;

        let response = Self::connector()?
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| classify(symbol, e))?;

        let quotes = response.quotes().map_err(|e| classify(symbol, e))?;

        Ok(quotes.iter().map(|q| convert_quote(symbol, q)).collect())
    }

    /// Get historical quotes for a named range (e.g., "1mo", "3mo", "1y")
    pub async fn get_historical_range(&self, symbol: &str, range: &str) -> Result<Vec<Quote>> {
        let end = Utc::now();
        let start = range_start(range, end)?;
        self.get_historical_quotes(symbol, start, end).await
    }

    /// Look up the company profile through Yahoo search
    pub async fn get_company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let response = self
            .http
            .get(&self.search_url)
            .query(&[("q", symbol), ("quotesCount", "5"), ("newsCount", "0")])
            .send()
            .await?;

        if response.status().as_u16() == 429 {
            return Err(ResearchError::RateLimited {
                provider: "yahoo".to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ResearchError::MarketData(format!(
                "Yahoo search returned {}",
                response.status()
            )));
        }

        let search: SearchResponse = response.json().await?;
        profile_from_search(symbol, search).ok_or_else(|| ResearchError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "symbol not found in Yahoo search".to_string(),
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn history(&self, symbol: &str, range: &str) -> Result<Vec<Quote>> {
        let quotes = self.get_historical_range(symbol, range).await?;
        debug!(bars = quotes.len(), "Fetched price history");
        Ok(quotes)
    }

    #[instrument(skip(self))]
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile> {
        self.get_company_profile(symbol).await
    }

    async fn validate_symbol(&self, symbol: &str) -> Result<bool> {
        match self.get_quote(symbol).await {
            Ok(_) => Ok(true),
            Err(ResearchError::DataUnavailable { reason, .. }) => {
                debug!(%symbol, %reason, "Symbol rejected by Yahoo");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// Map a connector error onto the research taxonomy
///
/// Throttling stays recoverable; an empty data set or Yahoo's "Not Found"
/// answer means the symbol has no data.
fn classify(symbol: &str, err: yahoo::YahooError) -> ResearchError {
    match err {
        yahoo::YahooError::TooManyRequests(_) => ResearchError::RateLimited {
            provider: "yahoo".to_string(),
        },
        yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes => {
            ResearchError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: err.to_string(),
            }
        }
        yahoo::YahooError::ApiError(ref message)
            if message
                .code
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case("not found")) =>
        {
            ResearchError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: message
                    .description
                    .clone()
                    .unwrap_or_else(|| err.to_string()),
            }
        }
        other => ResearchError::MarketData(other.to_string()),
    }
}

fn convert_quote(symbol: &str, q: &yahoo::Quote) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        timestamp: DateTime::from_timestamp(q.timestamp as i64, 0).unwrap_or_else(Utc::now),
        open: q.open,
        high: q.high,
        low: q.low,
        close: q.close,
        volume: q.volume,
        adjclose: q.adjclose,
    }
}

/// Start of a named range ending at `end`
pub fn range_start(range: &str, end: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let days = match range {
        "1d" => 1,
        "5d" => 5,
        "1mo" => 30,
        "3mo" => 90,
        "6mo" => 180,
        "1y" => 365,
        "2y" => 730,
        "5y" => 1825,
        "10y" => 3650,
        "max" => 36500,
        "ytd" => {
            return NaiveDate::from_ymd_opt(end.year(), 1, 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
                .ok_or_else(|| ResearchError::MarketData("Invalid year start".to_string()));
        }
        _ => {
            return Err(ResearchError::MarketData(format!("Invalid range: {range}")));
        }
    };

    Ok(end - Duration::days(days))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
    longname: Option<String>,
    shortname: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    #[serde(rename = "exchDisp")]
    exchange: Option<String>,
    #[serde(rename = "quoteType")]
    quote_type: Option<String>,
}

fn profile_from_search(symbol: &str, search: SearchResponse) -> Option<CompanyProfile> {
    let quote = search
        .quotes
        .into_iter()
        .find(|q| q.symbol.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(symbol)))?;

    let summary = match (&quote.industry, &quote.exchange) {
        (Some(industry), Some(exchange)) => {
            Some(format!("{industry} company listed on {exchange}."))
        }
        (Some(industry), None) => Some(format!("{industry} company.")),
        (None, Some(exchange)) => Some(format!(
            "{} listed on {exchange}.",
            quote.quote_type.as_deref().unwrap_or("Security")
        )),
        (None, None) => None,
    };

    Some(CompanyProfile {
        symbol: symbol.to_string(),
        name: quote.longname.or(quote.shortname),
        sector: quote.sector,
        industry: quote.industry,
        exchange: quote.exchange,
        summary,
    })
}
