//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Whether the provider throttled the request
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded(_))
    }

    /// Whether the error comes from missing or rejected credentials
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::AuthenticationFailed | Self::ConfigurationError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(LLMError::RateLimitExceeded("slow down".to_string()).is_rate_limited());
        assert!(!LLMError::RequestFailed("boom".to_string()).is_rate_limited());

        assert!(LLMError::AuthenticationFailed.is_credential_error());
        assert!(LLMError::ConfigurationError("missing key".to_string()).is_credential_error());
        assert!(!LLMError::ModelNotFound("x".to_string()).is_credential_error());
    }

    #[test]
    fn test_error_display() {
        let err = LLMError::RateLimitExceeded("try again in 20s".to_string());
        assert_eq!(err.to_string(), "Rate limit exceeded: try again in 20s");
    }
}
