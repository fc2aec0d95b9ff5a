//! Automated equity research for the AI investment committee
//!
//! One ticker flows through three stages:
//!
//! 1. **Research**: recent news through a [`NewsSearch`] backend
//!    (DuckDuckGo by default, Finnhub optionally)
//! 2. **Analyze**: one month of price history and the company profile from a
//!    [`MarketDataProvider`] (Yahoo Finance), headline [`Metrics`] with an
//!    SMA-20 signal, and a candlestick chart
//! 3. **Write**: a six-section markdown note drafted by an LLM
//!
//! The [`Pipeline`] runs the stages in order and can report progress after
//! each one; [`Pipeline::export_pdf`] turns the note into a paginated PDF.
//!
//! # Example
//!
//! ```ignore
//! use committee_research::{Pipeline, ResearchConfig};
//!
//! let config = ResearchConfig::from_env()?;
//! let pipeline = Pipeline::from_config(&config)?;
//! let result = pipeline.run("AAPL").await?;
//! let pdf = pipeline.export_pdf(&result).await?.path;
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod market;
pub mod pdf;
pub mod pipeline;
pub mod report;
pub mod ticker;

pub use analysis::{Metrics, Signal};
pub use api::{CompanyProfile, MarketDataProvider, NewsItem, NewsSearch, Quote};
pub use config::{NewsSource, ResearchConfig, ResearchConfigBuilder};
pub use error::{ResearchError, Result};
pub use market::{MarketDataAdapter, is_unavailable};
pub use pdf::{DocumentRenderer, RenderedReport};
pub use pipeline::{Analysis, AnalysisResult, Pipeline, Stage, StageUpdate};
pub use report::{REPORT_SECTIONS, ReportGenerator};
pub use ticker::{AnalysisRequest, Ticker};
