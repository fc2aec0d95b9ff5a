//! Candlestick chart rendering

use super::metrics::{SMA_PERIOD, sma_series};
use crate::api::Quote;
use crate::error::{ResearchError, Result};
use crate::ticker::Ticker;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Chart size in pixels
pub const CHART_SIZE: (u32, u32) = (1200, 800);

const PRICE_PANE_HEIGHT: u32 = 560;
const PLOT_WIDTH: f64 = 1100.0;

/// Text needs a font backend; without `chart-fonts` the panes carry no
/// caption or axis labels and the label areas collapse to zero.
const LABELLED: bool = cfg!(feature = "chart-fonts");
const Y_LABEL_AREA: u32 = if LABELLED { 60 } else { 0 };
const X_LABEL_AREA: u32 = if LABELLED { 30 } else { 0 };

/// Render `<TICKER>_chart.png` into `output_dir` and return its path
///
/// Upper pane: candles with the SMA overlay. Lower pane: volume bars
/// coloured by the direction of the day.
#[instrument(skip(quotes), fields(bars = quotes.len()))]
pub fn render_chart(ticker: &Ticker, quotes: &[Quote], output_dir: &Path) -> Result<PathBuf> {
    if quotes.is_empty() {
        return Err(ResearchError::Chart(format!("no price data for {ticker}")));
    }

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(ticker.chart_file_name());

    draw(ticker.as_str(), quotes, &path).map_err(|e| ResearchError::Chart(e.to_string()))?;

    debug!(path = %path.display(), "Chart written");
    Ok(path)
}

fn draw(
    ticker: &str,
    quotes: &[Quote],
    path: &Path,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(PRICE_PANE_HEIGHT);

    let bars = quotes.len();
    let x_range = -0.5_f64..(bars as f64 - 0.5);
    let candle_width = (PLOT_WIDTH / bars as f64 * 0.6).clamp(1.0, 30.0) as u32;

    let (low, high) = quotes
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), q| {
            (lo.min(q.low), hi.max(q.high))
        });
    let pad = ((high - low) * 0.05).max(0.01);

    let mut price_builder = ChartBuilder::on(&upper);
    price_builder
        .margin(10)
        .x_label_area_size(0)
        .y_label_area_size(Y_LABEL_AREA);
    if LABELLED {
        price_builder.caption(
            format!("{ticker} - Technical Analysis"),
            ("sans-serif", 24),
        );
    }
    let mut price_chart =
        price_builder.build_cartesian_2d(x_range.clone(), (low - pad)..(high + pad))?;

    let mut price_mesh = price_chart.configure_mesh();
    price_mesh.disable_x_mesh();
    if LABELLED {
        price_mesh.y_desc("Price");
    }
    price_mesh.draw()?;

    price_chart.draw_series(quotes.iter().enumerate().map(|(i, q)| {
        CandleStick::new(
            i as f64,
            q.open,
            q.high,
            q.low,
            q.close,
            GREEN.filled(),
            RED.filled(),
            candle_width,
        )
    }))?;

    let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
    let sma = sma_series(&closes, SMA_PERIOD)?;
    price_chart.draw_series(LineSeries::new(
        sma.iter().enumerate().map(|(i, &v)| (i as f64, v)),
        BLUE.stroke_width(2),
    ))?;

    let max_volume = quotes.iter().map(|q| q.volume).max().unwrap_or(0).max(1) as f64;
    let date_label = |x: &f64| -> String {
        let index = x.round();
        if index < 0.0 {
            return String::new();
        }
        quotes
            .get(index as usize)
            .map(|q| q.timestamp.format("%m-%d").to_string())
            .unwrap_or_default()
    };

    let mut volume_chart = ChartBuilder::on(&lower)
        .margin(10)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range, 0.0..max_volume * 1.1)?;

    let mut volume_mesh = volume_chart.configure_mesh();
    volume_mesh.disable_x_mesh();
    if LABELLED {
        volume_mesh
            .y_desc("Volume")
            .x_labels(bars.min(10))
            .x_label_formatter(&date_label);
    }
    volume_mesh.draw()?;

    volume_chart.draw_series(quotes.iter().enumerate().map(|(i, q)| {
        let color = if q.close >= q.open {
            GREEN.mix(0.6)
        } else {
            RED.mix(0.6)
        };
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, q.volume as f64)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn month_of_bars() -> Vec<Quote> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 13, 30, 0).unwrap();
        (0..22_i32)
            .map(|i| {
                let close = 180.0 + f64::from(i) * 0.7;
                Quote {
                    symbol: "AAPL".to_string(),
                    timestamp: start + Duration::days(i64::from(i)),
                    open: close - 0.5,
                    high: close + 1.5,
                    low: close - 1.5,
                    close,
                    volume: 40_000_000 + u64::from(i.unsigned_abs()) * 100_000,
                    adjclose: close,
                }
            })
            .collect()
    }

    #[test]
    fn test_render_chart_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let ticker = Ticker::parse("AAPL").unwrap();

        let path = render_chart(&ticker, &month_of_bars(), dir.path()).unwrap();

        assert_eq!(path, dir.path().join("AAPL_chart.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(
            printpdf::image_crate::image_dimensions(&path).unwrap(),
            CHART_SIZE
        );
    }

    #[test]
    fn test_render_chart_single_bar() {
        let dir = tempfile::tempdir().unwrap();
        let ticker = Ticker::parse("AAPL").unwrap();
        let bars = month_of_bars();

        let path = render_chart(&ticker, &bars[..1], dir.path()).unwrap();
        assert_eq!(
            printpdf::image_crate::image_dimensions(&path).unwrap(),
            CHART_SIZE
        );
    }

    #[test]
    fn test_render_chart_rejects_empty_series() {
        let dir = tempfile::tempdir().unwrap();
        let ticker = Ticker::parse("AAPL").unwrap();

        let err = render_chart(&ticker, &[], dir.path()).unwrap_err();
        assert!(matches!(err, ResearchError::Chart(_)));
        assert!(!dir.path().join("AAPL_chart.png").exists());
    }
}
