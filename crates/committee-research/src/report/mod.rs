//! Research note drafting

pub mod generator;
pub mod prompt;
pub mod sections;

pub use generator::ReportGenerator;
pub use prompt::render_report_prompt;
pub use sections::{CHART_ANCHOR_SECTION, REPORT_SECTIONS, Section, missing_sections, split_sections};
