//! Terminal rendering: stage cards, metrics table, result summary

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use committee_research::{AnalysisResult, Metrics, Stage, StageUpdate};
use std::fmt;
use std::path::Path;
use tokio::sync::mpsc::UnboundedReceiver;

/// Where a stage card stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Waiting,
    Running,
    Complete,
    Error,
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Waiting => "waiting",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        f.pad(label)
    }
}

/// One line per card transition
pub fn card_line(stage: Stage, state: CardState) -> String {
    format!("  [{state:>8}] {stage}")
}

/// Print the three cards as they stand before a run
pub fn print_board(active: Stage) {
    for stage in Stage::WORKING {
        let state = if stage == active {
            CardState::Running
        } else {
            CardState::Waiting
        };
        println!("{}", card_line(stage, state));
    }
}

/// Drain stage updates, printing transitions unless `quiet`
///
/// Returns the stage that was running when the channel closed; `Stage::Done`
/// after a complete run.
pub async fn follow_progress(mut updates: UnboundedReceiver<StageUpdate>, quiet: bool) -> Stage {
    let mut running = Stage::Researching;
    if !quiet {
        print_board(running);
    }

    while let Some(update) = updates.recv().await {
        let finished = update.stage();
        running = finished.next();
        if quiet {
            continue;
        }

        println!("{}", card_line(finished, CardState::Complete));
        if let Some(detail) = update_detail(&update) {
            println!("             {detail}");
        }
        if running != Stage::Done {
            println!("{}", card_line(running, CardState::Running));
        }
    }

    running
}

fn update_detail(update: &StageUpdate) -> Option<String> {
    match update {
        StageUpdate::Researched { news_summary } => {
            Some(format!("{} news lines", news_summary.lines().count()))
        }
        StageUpdate::Analyzed {
            metrics, chart_path, ..
        } => match (metrics, chart_path) {
            (Some(m), _) => Some(format!("{} | {}", m.display_price(), m.signal)),
            (None, Some(_)) => Some("chart only".to_string()),
            (None, None) => None,
        },
        StageUpdate::Written { report } => Some(format!("{} characters", report.len())),
    }
}

/// Headline metrics as a two-column table
pub fn metrics_table(metrics: &Metrics) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value"]);

    let change = format!(
        "{} ({})",
        metrics.display_change(),
        metrics.display_pct_change()
    );
    table.add_row(vec!["Current Price".to_string(), metrics.display_price()]);
    table.add_row(vec!["Daily Change".to_string(), change]);
    table.add_row(vec!["Volume".to_string(), metrics.display_volume()]);
    table.add_row(vec!["AI Signal".to_string(), metrics.signal.to_string()]);
    table
}

/// Print metrics, chart, warnings and the report
pub fn print_result(result: &AnalysisResult) {
    println!();
    match &result.metrics {
        Some(metrics) => println!("{}", metrics_table(metrics)),
        None => println!("Metrics unavailable for {}", result.ticker),
    }

    if let Some(chart) = &result.chart_path {
        println!("Chart: {}", chart.display());
    }

    for warning in &result.warnings {
        println!("Warning: {warning}");
    }

    println!("\n{}\n", result.report);
}

pub fn print_pdf(path: &Path) {
    println!("PDF report: {}\n", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use committee_research::Signal;

    #[test]
    fn test_card_line() {
        assert_eq!(
            card_line(Stage::Analyzing, CardState::Running),
            "  [ running] 02 The Analyst / Quantitative Analysis"
        );
    }

    #[test]
    fn test_metrics_table_rows() {
        let metrics = Metrics {
            current_price: 207.2,
            previous_close: 193.1,
            change: 14.1,
            pct_change: 7.3019,
            volume: 1_234_567,
            sma_20: Some(191.4),
            signal: Signal::Bullish,
        };
        let rendered = metrics_table(&metrics).to_string();

        assert!(rendered.contains("Current Price"));
        assert!(rendered.contains("$207.20"));
        assert!(rendered.contains("14.10 (7.30%)"));
        assert!(rendered.contains("1,234,567"));
        assert!(rendered.contains("BULLISH"));
    }

    #[tokio::test]
    async fn test_follow_progress_reaches_done() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(StageUpdate::Researched {
            news_summary: "a\nb".to_string(),
        })
        .unwrap();
        tx.send(StageUpdate::Analyzed {
            financial_data: String::new(),
            chart_path: None,
            metrics: None,
        })
        .unwrap();
        tx.send(StageUpdate::Written {
            report: "### Executive Summary".to_string(),
        })
        .unwrap();
        drop(tx);

        assert_eq!(follow_progress(rx, true).await, Stage::Done);
    }

    #[tokio::test]
    async fn test_follow_progress_stops_at_failed_stage() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(StageUpdate::Researched {
            news_summary: String::new(),
        })
        .unwrap();
        drop(tx);

        assert_eq!(follow_progress(rx, true).await, Stage::Analyzing);
    }
}
