//! Research → analyze → write pipeline

pub mod orchestrator;
pub mod result;
pub mod stage;

pub use orchestrator::Pipeline;
pub use result::{Analysis, AnalysisResult};
pub use stage::{Stage, StageUpdate};
