//! Text view of market data for the language model
//!
//! Provider failures are folded into placeholder strings so the report stage
//! always has something to read. Throttling is the exception: it is returned
//! as an error so callers can tell the user to retry.

use crate::api::{CompanyProfile, MarketDataProvider, Quote};
use crate::error::{ResearchError, Result};
use crate::ticker::Ticker;
use std::sync::Arc;
use tracing::{instrument, warn};

const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a symbol without history
pub fn no_data_text(ticker: &Ticker) -> String {
    format!("Error: No data found for ticker {ticker}.")
}

/// Whether a text field holds a placeholder rather than data
pub fn is_unavailable(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text.starts_with("Error")
}

/// Closing prices, one `YYYY-MM-DD  close` line per bar
pub fn format_price_history(quotes: &[Quote]) -> String {
    let mut text = String::from("Date        Close");
    for quote in quotes {
        text.push_str(&format!(
            "\n{}  {:.2}",
            quote.timestamp.format("%Y-%m-%d"),
            quote.close
        ));
    }
    text
}

/// Company block in `Company / Sector / Summary` form
pub fn profile_text(profile: &CompanyProfile) -> String {
    let field = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };

    format!(
        "Company: {}\nSector: {}\nSummary: {}",
        field(&profile.name),
        field(&profile.sector),
        field(&profile.summary)
    )
}

/// Profile and prices combined into the blob handed to the model
pub fn financial_data_blob(info: &str, prices: &str) -> String {
    format!("--- INFO ---\n{info}\n\n--- PRICES ---\n{prices}")
}

/// Everything the analyze stage reads from the market-data provider
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    /// Bars, oldest first; empty when unavailable
    pub quotes: Vec<Quote>,
    /// Profile text or its placeholder
    pub info: String,
    /// Price text or its placeholder
    pub prices: String,
    /// What degraded while fetching
    pub warnings: Vec<String>,
}

impl MarketSnapshot {
    /// Financial data blob for the report prompt
    pub fn financial_data(&self) -> String {
        financial_data_blob(&self.info, &self.prices)
    }
}

/// Wraps a market-data provider and renders its output as text
#[derive(Clone)]
pub struct MarketDataAdapter {
    provider: Arc<dyn MarketDataProvider>,
    range: String,
}

impl MarketDataAdapter {
    /// Create an adapter fetching `range` of history
    pub fn new(provider: Arc<dyn MarketDataProvider>, range: impl Into<String>) -> Self {
        Self {
            provider,
            range: range.into(),
        }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &Arc<dyn MarketDataProvider> {
        &self.provider
    }

    /// Fetch history and profile once
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn snapshot(&self, ticker: &Ticker) -> Result<MarketSnapshot> {
        let mut snapshot = MarketSnapshot::default();

        match self.provider.history(ticker.as_str(), &self.range).await {
            Ok(quotes) if quotes.is_empty() => {
                warn!(%ticker, "No price history returned");
                snapshot.prices = no_data_text(ticker);
                snapshot
                    .warnings
                    .push(format!("No price history found for {ticker}"));
            }
            Ok(quotes) => {
                snapshot.prices = format_price_history(&quotes);
                snapshot.quotes = quotes;
            }
            Err(e) if e.is_rate_limited() => return Err(e),
            Err(ResearchError::DataUnavailable { reason, .. }) => {
                warn!(%ticker, %reason, "Price history unavailable");
                snapshot.prices = no_data_text(ticker);
                snapshot
                    .warnings
                    .push(format!("No price history found for {ticker}: {reason}"));
            }
            Err(e) => {
                warn!(%ticker, error = %e, "Price history fetch failed");
                snapshot.prices = format!("Error fetching data: {e}");
                snapshot
                    .warnings
                    .push(format!("Price history provider error: {e}"));
            }
        }

        match self.provider.profile(ticker.as_str()).await {
            Ok(profile) => snapshot.info = profile_text(&profile),
            Err(e) if e.is_rate_limited() => return Err(e),
            Err(ResearchError::DataUnavailable { reason, .. }) => {
                warn!(%ticker, %reason, "Company profile unavailable");
                snapshot.info = profile_text(&CompanyProfile {
                    symbol: ticker.to_string(),
                    ..CompanyProfile::default()
                });
                snapshot
                    .warnings
                    .push(format!("No company profile found for {ticker}: {reason}"));
            }
            Err(e) => {
                warn!(%ticker, error = %e, "Company profile fetch failed");
                snapshot.info = format!("Error fetching info: {e}");
                snapshot
                    .warnings
                    .push(format!("Company profile provider error: {e}"));
            }
        }

        Ok(snapshot)
    }
}
