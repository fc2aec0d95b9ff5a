//! Research report PDF rendering
//!
//! [`layout`] positions everything on A4 pages; [`render`] draws that layout
//! with printpdf.

pub mod layout;
pub mod render;
pub mod text;

pub use layout::{ChartImage, DISCLAIMER, DocumentLayout, PageLayout, PlacedItem, layout_report};
pub use render::{DocumentRenderer, RenderedReport};
