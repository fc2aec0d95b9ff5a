//! Error types for research pipeline operations

use committee_llm::LLMError;
use thiserror::Error;

/// Research pipeline errors
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Missing or rejected credentials, or an invalid setting
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Ticker failed parsing or is unknown to the market-data provider
    #[error("Invalid ticker {ticker}: {reason}")]
    InvalidTicker {
        ticker: String,
        reason: String,
    },

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Upstream throttled the request
    #[error("Rate limit exceeded for {provider}")]
    RateLimited {
        provider: String,
    },

    /// Market-data provider error
    #[error("Market data error: {0}")]
    MarketData(String),

    /// Search provider error
    #[error("News search error: {0}")]
    NewsSearch(String),

    /// Language-model call failed for a reason other than throttling
    #[error("Report generation failed: {0}")]
    ReportGeneration(String),

    /// Chart rasterisation failed
    #[error("Chart error: {0}")]
    Chart(String),

    /// PDF layout or writing failed
    #[error("PDF render error: {0}")]
    Render(String),

    /// Prompt template error
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for research operations
pub type Result<T> = std::result::Result<T, ResearchError>;

impl ResearchError {
    /// Whether the error is upstream throttling that a later retry may clear
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Whether the error should stop the program rather than the request
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited { .. } => {
                "Rate limit reached. Please wait 30 seconds and try again.".to_string()
            }
            Self::InvalidTicker { ticker, .. } => {
                format!("Ticker \"{ticker}\" not found. Please verify the symbol.")
            }
            other => format!("Error: {other}"),
        }
    }
}

/// Classify a language-model failure into the research taxonomy
impl From<LLMError> for ResearchError {
    fn from(err: LLMError) -> Self {
        if err.is_rate_limited() {
            ResearchError::RateLimited {
                provider: "llm".to_string(),
            }
        } else if err.is_credential_error() {
            ResearchError::Configuration(err.to_string())
        } else {
            ResearchError::ReportGeneration(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResearchError::InvalidTicker {
            ticker: "ZZZZ".to_string(),
            reason: "unknown symbol".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid ticker ZZZZ: unknown symbol");

        let err = ResearchError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "No data found".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for AAPL: No data found");
    }

    #[test]
    fn test_llm_error_classification() {
        let err: ResearchError = LLMError::RateLimitExceeded("429".to_string()).into();
        assert!(err.is_rate_limited());
        assert!(!err.is_fatal());

        let err: ResearchError = LLMError::AuthenticationFailed.into();
        assert!(err.is_fatal());

        let err: ResearchError = LLMError::ConfigurationError("blank key".to_string()).into();
        assert!(matches!(err, ResearchError::Configuration(ref msg) if msg.contains("blank key")));

        let err: ResearchError = LLMError::RequestFailed("HTTP 500".to_string()).into();
        assert!(matches!(err, ResearchError::ReportGeneration(ref msg) if msg.contains("HTTP 500")));
    }

    #[test]
    fn test_user_messages() {
        let err = ResearchError::RateLimited {
            provider: "groq".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Rate limit reached. Please wait 30 seconds and try again."
        );

        let err = ResearchError::InvalidTicker {
            ticker: "NOPE".to_string(),
            reason: "unknown".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Ticker \"NOPE\" not found. Please verify the symbol."
        );

        let err = ResearchError::ReportGeneration("timeout".to_string());
        assert_eq!(err.user_message(), "Error: Report generation failed: timeout");
    }
}
