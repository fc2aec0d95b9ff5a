//! Report generation through a language-model provider

use super::prompt::render_report_prompt;
use super::sections::missing_sections;
use crate::error::{ResearchError, Result};
use crate::ticker::Ticker;
use committee_llm::{CompletionRequest, LLMError, LLMProvider, Message, StopReason};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Drafts the markdown research note
pub struct ReportGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    max_tokens: usize,
}

impl ReportGenerator {
    /// Create a generator for `model`
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: 4096,
        }
    }

    /// Set the completion token limit
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Model used for generation
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Draft a report from fetched data and news
    ///
    /// Requests run at temperature 0 so identical inputs give identical
    /// reports on providers that honour it.
    #[instrument(skip(self, data, news), fields(provider = self.provider.name(), model = %self.model))]
    pub async fn generate(&self, ticker: &Ticker, data: &str, news: &str) -> Result<String> {
        let prompt = render_report_prompt(ticker.as_str(), data, news)?;

        let request = CompletionRequest::builder(&self.model)
            .add_message(Message::user(prompt))
            .max_tokens(self.max_tokens)
            .temperature(0.0)
            .build();

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| self.classify(e))?;

        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total(),
            "Report drafted"
        );
        if response.stop_reason == StopReason::MaxTokens {
            warn!(max_tokens = self.max_tokens, "Report truncated at the token limit");
        }

        let report = response
            .message
            .text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                ResearchError::ReportGeneration("model returned an empty report".to_string())
            })?
            .to_string();

        let missing = missing_sections(&report);
        if !missing.is_empty() {
            warn!(?missing, "Report is missing required sections");
        }

        Ok(report)
    }

    fn classify(&self, err: LLMError) -> ResearchError {
        if err.is_rate_limited() {
            warn!(provider = self.provider.name(), "Language model rate limited");
            ResearchError::RateLimited {
                provider: self.provider.name().to_string(),
            }
        } else {
            err.into()
        }
    }
}
