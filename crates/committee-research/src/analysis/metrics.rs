//! Price metrics and the moving-average signal

use crate::api::Quote;
use crate::error::{ResearchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use ta::Next;
use ta::indicators::SimpleMovingAverage;

/// Moving-average window used for the signal
pub const SMA_PERIOD: usize = 20;

/// Trend signal from the latest close against the SMA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Bullish,
    Bearish,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => f.write_str("BULLISH"),
            Self::Bearish => f.write_str("BEARISH"),
        }
    }
}

/// Headline numbers for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub current_price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub pct_change: f64,
    pub volume: u64,
    /// Absent until a full window of closes exists
    pub sma_20: Option<f64>,
    pub signal: Signal,
}

impl Metrics {
    /// Compute from bars ordered oldest first; `None` with fewer than two bars
    pub fn compute(quotes: &[Quote]) -> Option<Self> {
        let [.., prev, last] = quotes else {
            return None;
        };

        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
        let sma_20 = if closes.len() >= SMA_PERIOD {
            sma_series(&closes, SMA_PERIOD).ok()?.last().copied()
        } else {
            None
        };

        let change = last.close - prev.close;
        let pct_change = if prev.close == 0.0 {
            0.0
        } else {
            change / prev.close * 100.0
        };
        let signal = match sma_20 {
            Some(sma) if last.close > sma => Signal::Bullish,
            _ => Signal::Bearish,
        };

        Some(Self {
            current_price: last.close,
            previous_close: prev.close,
            change,
            pct_change,
            volume: last.volume,
            sma_20,
            signal,
        })
    }

    /// `$123.45`
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.current_price)
    }

    /// `1.23`
    pub fn display_change(&self) -> String {
        format!("{:.2}", self.change)
    }

    /// `1.23%`
    pub fn display_pct_change(&self) -> String {
        format!("{:.2}%", self.pct_change)
    }

    /// `1,234,567`
    pub fn display_volume(&self) -> String {
        group_thousands(self.volume)
    }
}

/// Rolling SMA; the first `period - 1` values average the bars seen so far
pub fn sma_series(values: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut sma =
        SimpleMovingAverage::new(period).map_err(|e| ResearchError::Chart(e.to_string()))?;
    Ok(values.iter().map(|&v| sma.next(v)).collect())
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64]) -> Vec<Quote> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 13, 30, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Quote {
                symbol: "AAPL".to_string(),
                timestamp: start + Duration::days(i as i64),
                open: close - 1.0,
                high: close + 2.0,
                low: close - 2.0,
                close,
                volume: 50_000_000 + i as u64,
                adjclose: close,
            })
            .collect()
    }

    #[test]
    fn test_fewer_than_two_bars() {
        assert!(Metrics::compute(&[]).is_none());
        assert!(Metrics::compute(&series(&[100.0])).is_none());
    }

    #[test]
    fn test_change_and_percent() {
        let metrics = Metrics::compute(&series(&[100.0, 102.5])).unwrap();

        assert!((metrics.current_price - 102.5).abs() < f64::EPSILON);
        assert!((metrics.change - 2.5).abs() < 1e-9);
        assert!((metrics.pct_change - 2.5).abs() < 1e-9);
        assert_eq!(metrics.volume, 50_000_001);
    }

    #[test]
    fn test_short_history_has_no_sma_and_is_bearish() {
        let metrics = Metrics::compute(&series(&[100.0, 101.0, 150.0])).unwrap();
        assert_eq!(metrics.sma_20, None);
        assert_eq!(metrics.signal, Signal::Bearish);
    }

    #[test]
    fn test_bullish_above_sma() {
        let mut closes = vec![100.0; 21];
        closes.push(110.0);
        let metrics = Metrics::compute(&series(&closes)).unwrap();

        // Last 20 closes: nineteen 100s and one 110
        assert!((metrics.sma_20.unwrap() - 100.5).abs() < 1e-9);
        assert_eq!(metrics.signal, Signal::Bullish);
    }

    #[test]
    fn test_bearish_below_sma() {
        let mut closes = vec![100.0; 21];
        closes.push(90.0);
        let metrics = Metrics::compute(&series(&closes)).unwrap();
        assert_eq!(metrics.signal, Signal::Bearish);
    }

    #[test]
    fn test_sma_series_warms_up() {
        let values = sma_series(&[2.0, 4.0, 6.0, 8.0], 2).unwrap();
        assert_eq!(values, vec![2.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_display_formatting() {
        let metrics = Metrics {
            current_price: 189.984,
            previous_close: 191.0,
            change: -1.016,
            pct_change: -0.531_937,
            volume: 51_234_567,
            sma_20: Some(187.2),
            signal: Signal::Bullish,
        };

        assert_eq!(metrics.display_price(), "$189.98");
        assert_eq!(metrics.display_change(), "-1.02");
        assert_eq!(metrics.display_pct_change(), "-0.53%");
        assert_eq!(metrics.display_volume(), "51,234,567");
        assert_eq!(metrics.signal.to_string(), "BULLISH");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
    }
}
