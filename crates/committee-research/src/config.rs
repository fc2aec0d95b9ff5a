//! Configuration for research pipeline operations

use crate::error::{ResearchError, Result};
use committee_utils::{env_opt, env_parse};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default OpenAI-compatible endpoint (Groq)
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Environment variable holding the language-model key
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Search backend for the research stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsSource {
    /// DuckDuckGo HTML search (default, no API key required)
    #[default]
    DuckDuckGo,
    /// Finnhub company news (requires API key)
    Finnhub,
}

impl FromStr for NewsSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(Self::DuckDuckGo),
            "finnhub" => Ok(Self::Finnhub),
            other => Err(format!("unknown news source '{other}'")),
        }
    }
}

/// Configuration for the research pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Language-model API key
    #[serde(skip_serializing)]
    pub llm_api_key: Option<String>,

    /// OpenAI-compatible API base URL
    pub llm_api_base: String,

    /// Chat model name
    pub model: String,

    /// Completion token limit
    pub max_tokens: u32,

    /// Timeout for every outbound HTTP request
    pub request_timeout: Duration,

    /// History window handed to the market-data provider
    pub history_range: String,

    /// Maximum number of news results
    pub news_results: usize,

    /// Search backend
    pub news_source: NewsSource,

    /// Finnhub API key (optional)
    #[serde(skip_serializing)]
    pub finnhub_api_key: Option<String>,

    /// Finnhub requests per minute
    pub finnhub_rate_limit: u32,

    /// Directory receiving chart and PDF artifacts
    pub output_dir: PathBuf,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            request_timeout: Duration::from_secs(60),
            history_range: "1mo".to_string(),
            news_results: 5,
            news_source: NewsSource::DuckDuckGo,
            finnhub_api_key: None,
            finnhub_rate_limit: 60, // free tier
            output_dir: PathBuf::from("."),
        }
    }
}

impl ResearchConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResearchConfigBuilder {
        ResearchConfigBuilder::default()
    }

    /// Defaults overridden by the environment, validated
    pub fn from_env() -> Result<Self> {
        let config = Self::default().with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides; unset variables keep current values
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(key) = env_opt(API_KEY_VAR) {
            self.llm_api_key = Some(key);
        }
        if let Some(base) = env_opt("LLM_API_BASE") {
            self.llm_api_base = base;
        }
        if let Some(model) = env_opt("LLM_MODEL") {
            self.model = model;
        }
        if let Some(max_tokens) = env_parse("LLM_MAX_TOKENS").map_err(config_error)? {
            self.max_tokens = max_tokens;
        }
        if let Some(secs) = env_parse("LLM_TIMEOUT_SECS").map_err(config_error)? {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = env_opt("REPORT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(source) = env_parse("NEWS_SOURCE").map_err(config_error)? {
            self.news_source = source;
        }
        if let Some(key) = env_opt("FINNHUB_API_KEY") {
            self.finnhub_api_key = Some(key);
        }
        if let Some(rate) = env_parse("FINNHUB_RATE_LIMIT").map_err(config_error)? {
            self.finnhub_rate_limit = rate;
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.llm_api_key.as_deref().is_none_or(|key| key.trim().is_empty()) {
            return Err(ResearchError::Configuration(format!(
                "{API_KEY_VAR} not found. Please configure your .env file or system secrets."
            )));
        }

        if self.max_tokens == 0 {
            return Err(ResearchError::Configuration(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.news_results == 0 {
            return Err(ResearchError::Configuration(
                "news_results must be greater than 0".to_string(),
            ));
        }

        if self.news_source == NewsSource::Finnhub {
            if self.finnhub_api_key.is_none() {
                return Err(ResearchError::Configuration(
                    "FINNHUB_API_KEY required when NEWS_SOURCE=finnhub".to_string(),
                ));
            }
            if self.finnhub_rate_limit == 0 {
                return Err(ResearchError::Configuration(
                    "finnhub_rate_limit must be greater than 0".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn config_error(err: committee_utils::EnvError) -> ResearchError {
    ResearchError::Configuration(err.to_string())
}

/// Builder for ResearchConfig
#[derive(Debug, Default)]
pub struct ResearchConfigBuilder {
    llm_api_key: Option<String>,
    llm_api_base: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    request_timeout: Option<Duration>,
    history_range: Option<String>,
    news_results: Option<usize>,
    news_source: Option<NewsSource>,
    finnhub_api_key: Option<String>,
    finnhub_rate_limit: Option<u32>,
    output_dir: Option<PathBuf>,
}

impl ResearchConfigBuilder {
    /// Set the language-model API key
    pub fn llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.llm_api_key = Some(key.into());
        self
    }

    /// Set the OpenAI-compatible API base URL
    pub fn llm_api_base(mut self, base: impl Into<String>) -> Self {
        self.llm_api_base = Some(base.into());
        self
    }

    /// Set the chat model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the completion token limit
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the history window (e.g., "1mo")
    pub fn history_range(mut self, range: impl Into<String>) -> Self {
        self.history_range = Some(range.into());
        self
    }

    /// Set the maximum number of news results
    pub fn news_results(mut self, count: usize) -> Self {
        self.news_results = Some(count);
        self
    }

    /// Set the search backend
    pub fn news_source(mut self, source: NewsSource) -> Self {
        self.news_source = Some(source);
        self
    }

    /// Set the Finnhub API key
    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    /// Set the Finnhub requests per minute
    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    /// Set the artifact directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResearchConfig> {
        let defaults = ResearchConfig::default();

        let config = ResearchConfig {
            llm_api_key: self.llm_api_key,
            llm_api_base: self.llm_api_base.unwrap_or(defaults.llm_api_base),
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            history_range: self.history_range.unwrap_or(defaults.history_range),
            news_results: self.news_results.unwrap_or(defaults.news_results),
            news_source: self.news_source.unwrap_or(defaults.news_source),
            finnhub_api_key: self.finnhub_api_key,
            finnhub_rate_limit: self.finnhub_rate_limit.unwrap_or(defaults.finnhub_rate_limit),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResearchConfig::default();
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.history_range, "1mo");
        assert_eq!(config.news_results, 5);
        assert_eq!(config.news_source, NewsSource::DuckDuckGo);
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let err = ResearchConfig::default().validate().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("GROQ_API_KEY not found"));

        let err = ResearchConfig::builder().llm_api_key("   ").build().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_builder() {
        let config = ResearchConfig::builder()
            .llm_api_key("gsk_test")
            .model("llama-3.1-8b-instant")
            .max_tokens(2048)
            .output_dir("/tmp/reports")
            .build()
            .unwrap();

        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.llm_api_base, DEFAULT_API_BASE);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn test_finnhub_requires_key() {
        let result = ResearchConfig::builder()
            .llm_api_key("gsk_test")
            .news_source(NewsSource::Finnhub)
            .build();
        assert!(result.is_err());

        let config = ResearchConfig::builder()
            .llm_api_key("gsk_test")
            .news_source(NewsSource::Finnhub)
            .finnhub_api_key("fh_test")
            .build()
            .unwrap();
        assert_eq!(config.finnhub_rate_limit, 60);
    }

    #[test]
    fn test_zero_news_results_rejected() {
        let result = ResearchConfig::builder()
            .llm_api_key("gsk_test")
            .news_results(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_news_source_from_str() {
        assert_eq!("DuckDuckGo".parse::<NewsSource>(), Ok(NewsSource::DuckDuckGo));
        assert_eq!("finnhub".parse::<NewsSource>(), Ok(NewsSource::Finnhub));
        assert!("bing".parse::<NewsSource>().is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = ResearchConfig::builder().llm_api_key("secret").build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
