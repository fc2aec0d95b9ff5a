//! The research pipeline: research, analyze, write

use super::result::{Analysis, AnalysisResult};
use super::stage::{Stage, StageUpdate};
use crate::analysis::{Metrics, render_chart};
use crate::api::{
    DuckDuckGoClient, FinnhubClient, MarketDataProvider, NewsSearch, YahooFinanceClient,
};
use crate::config::{DEFAULT_API_BASE, NewsSource, ResearchConfig};
use crate::error::{ResearchError, Result};
use crate::market::MarketDataAdapter;
use crate::pdf::{DocumentRenderer, RenderedReport};
use crate::report::ReportGenerator;
use crate::ticker::Ticker;
use committee_llm::LLMProvider;
use committee_llm::providers::{OpenAIConfig, OpenAIProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

/// Runs the three stages for one ticker at a time
///
/// Collaborators are injected so tests and alternative providers can stand in
/// for Yahoo, DuckDuckGo and Groq. The pipeline holds no per-request state;
/// one instance can serve any number of sequential or concurrent runs.
pub struct Pipeline {
    market: MarketDataAdapter,
    news: Arc<dyn NewsSearch>,
    writer: ReportGenerator,
    renderer: DocumentRenderer,
    news_results: usize,
    output_dir: PathBuf,
}

impl Pipeline {
    /// Assemble a pipeline from explicit collaborators
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsSearch>,
        llm: Arc<dyn LLMProvider>,
        config: &ResearchConfig,
    ) -> Self {
        Self {
            market: MarketDataAdapter::new(market, config.history_range.clone()),
            news,
            writer: ReportGenerator::new(llm, config.model.clone())
                .with_max_tokens(config.max_tokens as usize),
            renderer: DocumentRenderer::new(),
            news_results: config.news_results,
            output_dir: config.output_dir.clone(),
        }
    }

    /// Build the default Yahoo, search and OpenAI-compatible clients
    ///
    /// Fails before any network call when credentials are missing.
    pub fn from_config(config: &ResearchConfig) -> Result<Self> {
        config.validate()?;

        let api_key = config.llm_api_key.clone().ok_or_else(|| {
            ResearchError::Configuration("language-model API key missing".to_string())
        })?;
        let llm_config = if config.llm_api_base == DEFAULT_API_BASE {
            OpenAIConfig::groq(api_key)
        } else {
            OpenAIConfig::new(api_key)
                .with_api_base(&config.llm_api_base)
                .with_provider_name("openai-compatible")
        };
        let llm = OpenAIProvider::with_config(
            llm_config.with_timeout(config.request_timeout.as_secs()),
        )?;

        let market = YahooFinanceClient::new(config.request_timeout)?;
        let news: Arc<dyn NewsSearch> = match config.news_source {
            NewsSource::DuckDuckGo => Arc::new(DuckDuckGoClient::new(config.request_timeout)?),
            NewsSource::Finnhub => {
                let key = config.finnhub_api_key.clone().ok_or_else(|| {
                    ResearchError::Configuration("FINNHUB_API_KEY missing".to_string())
                })?;
                Arc::new(FinnhubClient::new(
                    key,
                    config.finnhub_rate_limit,
                    config.request_timeout,
                )?)
            }
        };

        info!(
            llm = llm.name(),
            model = %config.model,
            news = news.name(),
            "Pipeline configured"
        );
        Ok(Self::new(Arc::new(market), news, Arc::new(llm), config))
    }

    /// Directory receiving artifacts
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Parse the ticker and confirm the market-data provider knows it
    pub async fn validate(&self, input: &str) -> Result<Ticker> {
        let ticker = Ticker::parse(input)?;
        if self.market.provider().validate_symbol(ticker.as_str()).await? {
            Ok(ticker)
        } else {
            Err(ResearchError::InvalidTicker {
                reason: format!("unknown to {}", self.market.provider().name()),
                ticker: ticker.into(),
            })
        }
    }

    /// Run all stages and return the assembled result
    pub async fn run(&self, input: &str) -> Result<AnalysisResult> {
        self.execute(input, None).await
    }

    /// Run all stages, sending one update per completed stage
    ///
    /// A dropped receiver does not stop the run.
    pub async fn run_with_progress(
        &self,
        input: &str,
        progress: UnboundedSender<StageUpdate>,
    ) -> Result<AnalysisResult> {
        self.execute(input, Some(&progress)).await
    }

    /// Write `<TICKER>_Report.pdf` into the output directory
    #[instrument(skip(self, result), fields(ticker = %result.ticker))]
    pub async fn export_pdf(&self, result: &AnalysisResult) -> Result<RenderedReport> {
        let output = self.output_dir.join(result.ticker.report_file_name());
        let renderer = self.renderer;
        let ticker = result.ticker.to_string();
        let report = result.report.clone();
        let chart = result.chart_path.clone();

        let rendered = tokio::task::spawn_blocking(move || {
            renderer.render(&ticker, &report, &output, chart.as_deref())
        })
        .await
        .map_err(|e| ResearchError::Render(e.to_string()))??;

        info!(
            path = %rendered.path.display(),
            pages = rendered.layout.pages.len(),
            "Report exported"
        );
        Ok(rendered)
    }

    #[instrument(name = "pipeline", skip(self, progress))]
    async fn execute(
        &self,
        input: &str,
        progress: Option<&UnboundedSender<StageUpdate>>,
    ) -> Result<AnalysisResult> {
        let ticker = self.validate(input).await?;

        let mut stage = Stage::Researching;
        info!(%ticker, %stage, "Stage started");
        let (news_summary, warnings) = self.research(&ticker).await?;
        notify(
            progress,
            StageUpdate::Researched {
                news_summary: news_summary.clone(),
            },
        );

        stage = stage.next();
        info!(%ticker, %stage, "Stage started");
        let analysis = self.analyze(&ticker).await?;
        notify(
            progress,
            StageUpdate::Analyzed {
                financial_data: analysis.financial_data.clone(),
                chart_path: analysis.chart_path.clone(),
                metrics: analysis.metrics.clone(),
            },
        );

        stage = stage.next();
        info!(%ticker, %stage, model = self.writer.model(), "Stage started");
        let report = self
            .writer
            .generate(&ticker, &analysis.financial_data, &news_summary)
            .await?;
        notify(
            progress,
            StageUpdate::Written {
                report: report.clone(),
            },
        );

        stage = stage.next();
        let result = AnalysisResult::new(ticker, news_summary, analysis, report, warnings);
        info!(
            ticker = %result.ticker,
            %stage,
            warnings = result.warnings.len(),
            "Pipeline finished"
        );
        Ok(result)
    }

    /// News failures degrade to a placeholder unless they are fatal
    async fn research(&self, ticker: &Ticker) -> Result<(String, Vec<String>)> {
        let query = format!("{ticker} stock latest news financial analysis");

        match self
            .news
            .search(ticker.as_str(), &query, self.news_results)
            .await
        {
            Ok(items) if items.is_empty() => {
                warn!(%ticker, source = self.news.name(), "No news results");
                Ok((
                    format!("No recent news found for {ticker}."),
                    vec![format!("No news results for {ticker}")],
                ))
            }
            Ok(items) => {
                debug!(%ticker, results = items.len(), "News collected");
                let summary = items
                    .iter()
                    .map(|item| format!("- {}: {}", item.title, item.body))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok((summary, Vec::new()))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(%ticker, source = self.news.name(), error = %e, "News search failed");
                Ok((
                    format!("Unable to fetch news for {ticker}"),
                    vec![format!("News search failed: {e}")],
                ))
            }
        }
    }

    async fn analyze(&self, ticker: &Ticker) -> Result<Analysis> {
        let snapshot = self.market.snapshot(ticker).await?;
        let financial_data = snapshot.financial_data();
        let mut warnings = snapshot.warnings;

        if snapshot.quotes.is_empty() {
            return Ok(Analysis {
                financial_data,
                chart_path: None,
                metrics: None,
                warnings,
            });
        }

        let metrics = Metrics::compute(&snapshot.quotes);
        let chart_ticker = ticker.clone();
        let output_dir = self.output_dir.clone();
        let quotes = snapshot.quotes;
        let chart = tokio::task::spawn_blocking(move || {
            render_chart(&chart_ticker, &quotes, &output_dir)
        })
        .await
        .map_err(|e| ResearchError::Chart(e.to_string()))
        .and_then(|rendered| rendered);

        let (chart_path, metrics) = match chart {
            Ok(path) => (Some(path), metrics),
            Err(e) => {
                warn!(%ticker, error = %e, "Chart rendering failed");
                warnings.push(format!("Chart unavailable: {e}"));
                (None, None)
            }
        };
        if chart_path.is_some() && metrics.is_none() {
            warnings.push(format!("Not enough price history for metrics on {ticker}"));
        }

        Ok(Analysis {
            financial_data,
            chart_path,
            metrics,
            warnings,
        })
    }
}

fn notify(progress: Option<&UnboundedSender<StageUpdate>>, update: StageUpdate) {
    if let Some(sender) = progress {
        let stage = update.stage();
        if sender.send(update).is_err() {
            debug!(%stage, "Progress receiver dropped");
        }
    }
}
