//! Clients for the market-data and news providers
//!
//! Each provider sits behind a small async trait so the pipeline receives its
//! collaborators as `Arc<dyn ...>` handles instead of building them inline.

pub mod duckduckgo;
pub mod finnhub;
pub mod yahoo;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use duckduckgo::DuckDuckGoClient;
pub use finnhub::FinnhubClient;
pub use yahoo::YahooFinanceClient;

/// One OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

/// Company information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub exchange: Option<String>,
    pub summary: Option<String>,
}

/// A search hit used as research input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub body: String,
}

/// Source of price history and company profiles
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Bars for `symbol` over a named range such as `"1mo"`, oldest first
    async fn history(&self, symbol: &str, range: &str) -> Result<Vec<Quote>>;

    /// Descriptive company data
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile>;

    /// Whether the provider knows the symbol
    async fn validate_symbol(&self, symbol: &str) -> Result<bool>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Web or news search
#[async_trait]
pub trait NewsSearch: Send + Sync {
    /// Up to `max_results` hits for `query`; `symbol` lets ticker-keyed
    /// providers ignore the free-text query
    async fn search(&self, symbol: &str, query: &str, max_results: usize) -> Result<Vec<NewsItem>>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
