//! Quantitative analysis: metrics and chart

pub mod chart;
pub mod metrics;

pub use chart::{CHART_SIZE, render_chart};
pub use metrics::{Metrics, SMA_PERIOD, Signal, sma_series};
