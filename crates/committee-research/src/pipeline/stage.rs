//! Pipeline stages and progress updates

use crate::analysis::Metrics;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Position of a run in the fixed stage sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Researching,
    Analyzing,
    Writing,
    Done,
}

impl Stage {
    /// Stages that do work, in order
    pub const WORKING: [Stage; 3] = [Stage::Researching, Stage::Analyzing, Stage::Writing];

    /// The stage that follows; `Done` is terminal
    pub fn next(self) -> Self {
        match self {
            Self::Researching => Self::Analyzing,
            Self::Analyzing => Self::Writing,
            Self::Writing | Self::Done => Self::Done,
        }
    }

    /// 1-based position among the working stages
    pub fn number(self) -> Option<usize> {
        Self::WORKING.iter().position(|s| *s == self).map(|i| i + 1)
    }

    /// Who performs the stage
    pub fn role(self) -> &'static str {
        match self {
            Self::Researching => "The Researcher",
            Self::Analyzing => "The Analyst",
            Self::Writing => "The Writer",
            Self::Done => "Committee",
        }
    }

    /// What the stage produces
    pub fn title(self) -> &'static str {
        match self {
            Self::Researching => "Data Acquisition",
            Self::Analyzing => "Quantitative Analysis",
            Self::Writing => "Final Synthesis",
            Self::Done => "Complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number() {
            Some(n) => write!(f, "{n:02} {} / {}", self.role(), self.title()),
            None => f.write_str(self.title()),
        }
    }
}

/// Emitted once per completed stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageUpdate {
    Researched {
        news_summary: String,
    },
    Analyzed {
        financial_data: String,
        chart_path: Option<PathBuf>,
        metrics: Option<Metrics>,
    },
    Written {
        report: String,
    },
}

impl StageUpdate {
    /// The stage this update completes
    pub fn stage(&self) -> Stage {
        match self {
            Self::Researched { .. } => Stage::Researching,
            Self::Analyzed { .. } => Stage::Analyzing,
            Self::Written { .. } => Stage::Writing,
        }
    }
}
