//! Pipeline result types

use crate::analysis::Metrics;
use crate::ticker::Ticker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output of the analyze stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub financial_data: String,
    pub chart_path: Option<PathBuf>,
    pub metrics: Option<Metrics>,
    pub warnings: Vec<String>,
}

/// Everything one run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ticker: Ticker,
    pub news_summary: String,
    pub financial_data: String,
    pub chart_path: Option<PathBuf>,
    pub metrics: Option<Metrics>,
    pub report: String,
    /// Degradations recorded along the way
    pub warnings: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(
        ticker: Ticker,
        news_summary: String,
        analysis: Analysis,
        report: String,
        mut warnings: Vec<String>,
    ) -> Self {
        warnings.extend(analysis.warnings);
        Self {
            ticker,
            news_summary,
            financial_data: analysis.financial_data,
            chart_path: analysis.chart_path,
            metrics: analysis.metrics,
            report,
            warnings,
            completed_at: Utc::now(),
        }
    }

    /// Whether the run finished without degrading
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}
