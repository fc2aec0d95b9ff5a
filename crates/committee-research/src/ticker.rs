//! Ticker symbols and analysis requests

use crate::error::{ResearchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_TICKER_LEN: usize = 15;

/// An exchange ticker, trimmed and upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Normalise user input into a ticker
    ///
    /// Accepts letters, digits and the separators Yahoo uses for share
    /// classes, indices and currencies (`.`, `-`, `^`, `=`).
    pub fn parse(input: &str) -> Result<Self> {
        let symbol = input.trim().to_uppercase();

        if symbol.is_empty() {
            return Err(ResearchError::InvalidTicker {
                ticker: String::new(),
                reason: "ticker is empty".to_string(),
            });
        }

        if symbol.len() > MAX_TICKER_LEN {
            return Err(ResearchError::InvalidTicker {
                ticker: symbol,
                reason: format!("longer than {MAX_TICKER_LEN} characters"),
            });
        }

        if let Some(bad) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(ResearchError::InvalidTicker {
                reason: format!("unexpected character '{bad}'"),
                ticker: symbol,
            });
        }

        Ok(Self(symbol))
    }

    /// The symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Chart artifact file name
    pub fn chart_file_name(&self) -> String {
        format!("{}_chart.png", self.0)
    }

    /// PDF artifact file name
    pub fn report_file_name(&self) -> String {
        format!("{}_Report.pdf", self.0)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ticker {
    type Error = ResearchError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

/// A request to analyse one ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub ticker: Ticker,
}

impl AnalysisRequest {
    /// Build a request from raw user input
    pub fn new(input: &str) -> Result<Self> {
        Ok(Self {
            ticker: Ticker::parse(input)?,
        })
    }
}
