//! Page layout for research reports
//!
//! Layout is a plain value: pages of positioned items measured in
//! millimetres from the top-left corner of an A4 page. Drawing happens
//! separately in [`super::render`].

use super::text::{MM_PER_PT, clean_body, fold_to_ascii, text_width_mm, wrap_text};
use crate::report::{CHART_ANCHOR_SECTION, split_sections};
use serde::Serialize;
use std::path::PathBuf;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const SIDE_MARGIN_MM: f32 = 10.0;
pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * SIDE_MARGIN_MM;

/// Rule under the page header
pub const HEADER_RULE_Y_MM: f32 = 28.0;
/// First body line
pub const BODY_TOP_MM: f32 = 32.0;
/// Body text never extends below this line
pub const BODY_BOTTOM_MM: f32 = PAGE_HEIGHT_MM - 35.0;
/// Top of the footer block
pub const FOOTER_TOP_MM: f32 = PAGE_HEIGHT_MM - 30.0;

pub const CHART_X_MM: f32 = 15.0;
pub const CHART_WIDTH_MM: f32 = 180.0;

pub const DISCLAIMER: &str = "LEGAL DISCLAIMER: This report is an AI-generated informative tool. \
It does not constitute financial advice, investment recommendations, or legal solicitation. \
The user assumes all responsibility for investment decisions.";

const HEADER_TITLE: &str = "AI Investment Committee";
const HEADER_SUBTITLE: &str = "Automated Equity Research Report";

const BODY_SIZE: f32 = 11.0;
const BODY_LINE_MM: f32 = 5.5;
const SECTION_SIZE: f32 = 12.0;
const SECTION_BAND_MM: f32 = 8.0;
const SECTION_GAP_MM: f32 = 4.0;
const TITLE_SIZE: f32 = 20.0;
const DISCLAIMER_SIZE: f32 = 7.0;
const DISCLAIMER_LINE_MM: f32 = 3.5;
const BAND_GRAY: f32 = 0.9;
const DISCLAIMER_GRAY: f32 = 0.5;

/// Font face among the built-in Helvetica family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// A positioned drawing instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlacedItem {
    /// Single line of text; `y` is the top of the line box, `gray` 0 is black
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        gray: f32,
    },
    /// Horizontal rule
    Rule { x1: f32, x2: f32, y: f32 },
    /// Filled rectangle
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        gray: f32,
    },
    /// Raster image scaled to the given box
    Image {
        path: PathBuf,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl PlacedItem {
    /// Lowest point the item reaches
    pub fn bottom(&self) -> f32 {
        match self {
            Self::Text { y, size, .. } => y + size * MM_PER_PT,
            Self::Rule { y, .. } => *y,
            Self::Fill { y, height, .. } | Self::Image { y, height, .. } => y + height,
        }
    }

    /// Text content, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// One laid-out page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    /// 1-based page number
    pub number: usize,
    pub header: Vec<PlacedItem>,
    pub body: Vec<PlacedItem>,
    pub footer: Vec<PlacedItem>,
}

impl PageLayout {
    /// All items in drawing order
    pub fn items(&self) -> impl Iterator<Item = &PlacedItem> {
        self.header.iter().chain(&self.body).chain(&self.footer)
    }
}

/// Chart image with its pixel size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
}

/// A fully positioned document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    /// Body items of every page, in reading order
    pub fn body_items(&self) -> impl Iterator<Item = &PlacedItem> {
        self.pages.iter().flat_map(|page| page.body.iter())
    }
}

/// Lay out a report for `ticker`
pub fn layout_report(ticker: &str, markdown: &str, chart: Option<&ChartImage>) -> DocumentLayout {
    let mut builder = LayoutBuilder::new();

    builder.centered_line(
        &format!("EQUITY RESEARCH: {}", fold_to_ascii(ticker)),
        TITLE_SIZE,
        FontStyle::Bold,
        12.0,
    );
    builder.advance(SECTION_GAP_MM);

    let mut chart_pending = chart;
    for section in split_sections(markdown) {
        if let Some(title) = &section.title {
            builder.section_band(&fold_to_ascii(title).to_uppercase());
        }
        builder.paragraph(&clean_body(&section.body));
        builder.advance(SECTION_GAP_MM);

        if section.is_titled(CHART_ANCHOR_SECTION) {
            if let Some(image) = chart_pending.take() {
                builder.image(image);
            }
        }
    }

    builder.finish(format!("EQUITY RESEARCH: {ticker}"))
}

struct LayoutBuilder {
    pages: Vec<PageLayout>,
    current: Vec<PlacedItem>,
    y: f32,
}

impl LayoutBuilder {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: BODY_TOP_MM,
        }
    }

    fn advance(&mut self, mm: f32) {
        self.y += mm;
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y + height > BODY_BOTTOM_MM && !self.current.is_empty() {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(PageLayout {
            number,
            header: Vec::new(),
            body: std::mem::take(&mut self.current),
            footer: Vec::new(),
        });
        self.y = BODY_TOP_MM;
    }

    fn centered_line(&mut self, text: &str, size: f32, style: FontStyle, height: f32) {
        self.ensure_room(height);
        let width = text_width_mm(text, size).min(CONTENT_WIDTH_MM);
        self.current.push(PlacedItem::Text {
            text: text.to_string(),
            x: (PAGE_WIDTH_MM - width) / 2.0,
            y: self.y,
            size,
            style,
            gray: 0.0,
        });
        self.advance(height);
    }

    fn section_band(&mut self, title: &str) {
        // Keep the band together with its first body line
        self.ensure_room(SECTION_BAND_MM + 2.0 + BODY_LINE_MM);
        self.current.push(PlacedItem::Fill {
            x: SIDE_MARGIN_MM,
            y: self.y,
            width: CONTENT_WIDTH_MM,
            height: SECTION_BAND_MM,
            gray: BAND_GRAY,
        });
        self.current.push(PlacedItem::Text {
            text: title.to_string(),
            x: SIDE_MARGIN_MM + 2.0,
            y: self.y + (SECTION_BAND_MM - SECTION_SIZE * MM_PER_PT) / 2.0,
            size: SECTION_SIZE,
            style: FontStyle::Bold,
            gray: 0.0,
        });
        self.advance(SECTION_BAND_MM + 2.0);
    }

    fn paragraph(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        for line in wrap_text(text, BODY_SIZE, CONTENT_WIDTH_MM) {
            if line.is_empty() {
                self.advance(BODY_LINE_MM / 2.0);
                continue;
            }
            self.ensure_room(BODY_LINE_MM);
            self.current.push(PlacedItem::Text {
                text: line,
                x: SIDE_MARGIN_MM,
                y: self.y,
                size: BODY_SIZE,
                style: FontStyle::Regular,
                gray: 0.0,
            });
            self.advance(BODY_LINE_MM);
        }
    }

    fn image(&mut self, image: &ChartImage) {
        let max_height = BODY_BOTTOM_MM - BODY_TOP_MM;
        let aspect = if image.width_px == 0 {
            0.0
        } else {
            image.height_px as f32 / image.width_px as f32
        };
        let mut width = CHART_WIDTH_MM;
        let mut height = width * aspect;
        if height > max_height {
            width *= max_height / height;
            height = max_height;
        }

        self.ensure_room(height);
        self.current.push(PlacedItem::Image {
            path: image.path.clone(),
            x: CHART_X_MM,
            y: self.y,
            width,
            height,
        });
        self.advance(height + SECTION_GAP_MM);
    }

    fn finish(mut self, title: String) -> DocumentLayout {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.break_page();
        }

        for page in &mut self.pages {
            page.header = header_items();
            page.footer = footer_items(page.number);
        }

        DocumentLayout {
            title,
            pages: self.pages,
        }
    }
}

fn centered(text: &str, size: f32, style: FontStyle, y: f32, gray: f32) -> PlacedItem {
    let width = text_width_mm(text, size).min(CONTENT_WIDTH_MM);
    PlacedItem::Text {
        text: text.to_string(),
        x: (PAGE_WIDTH_MM - width) / 2.0,
        y,
        size,
        style,
        gray,
    }
}

fn left_aligned(text: &str, size: f32, style: FontStyle, y: f32) -> PlacedItem {
    PlacedItem::Text {
        text: text.to_string(),
        x: SIDE_MARGIN_MM,
        y,
        size,
        style,
        gray: 0.0,
    }
}

fn header_items() -> Vec<PlacedItem> {
    vec![
        left_aligned(HEADER_TITLE, 15.0, FontStyle::Bold, 10.0),
        left_aligned(HEADER_SUBTITLE, 10.0, FontStyle::Italic, 19.0),
        PlacedItem::Rule {
            x1: SIDE_MARGIN_MM,
            x2: PAGE_WIDTH_MM - SIDE_MARGIN_MM,
            y: HEADER_RULE_Y_MM,
        },
    ]
}

fn footer_items(page: usize) -> Vec<PlacedItem> {
    let mut items = Vec::new();
    let mut y = FOOTER_TOP_MM;
    for line in wrap_text(DISCLAIMER, DISCLAIMER_SIZE, CONTENT_WIDTH_MM) {
        items.push(centered(
            &line,
            DISCLAIMER_SIZE,
            FontStyle::Italic,
            y,
            DISCLAIMER_GRAY,
        ));
        y += DISCLAIMER_LINE_MM;
    }
    items.push(centered(
        &format!("Page {page}"),
        8.0,
        FontStyle::Italic,
        y + 1.5,
        0.0,
    ));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::REPORT_SECTIONS;

    fn report(body_lines: usize) -> String {
        let body = (0..body_lines)
            .map(|i| format!("Line {i} of **analysis** about margins and services revenue."))
            .collect::<Vec<_>>()
            .join("\n");
        REPORT_SECTIONS
            .iter()
            .map(|header| format!("### {header}\n{body}\n"))
            .collect()
    }

    fn chart() -> ChartImage {
        ChartImage {
            path: PathBuf::from("AAPL_chart.png"),
            width_px: 1200,
            height_px: 800,
        }
    }

    fn texts(layout: &DocumentLayout) -> Vec<&str> {
        layout.body_items().filter_map(PlacedItem::text).collect()
    }

    #[test]
    fn test_first_page_title_and_section_bands() {
        let layout = layout_report("AAPL", &report(2), None);
        let texts = texts(&layout);

        assert_eq!(texts[0], "EQUITY RESEARCH: AAPL");
        for header in REPORT_SECTIONS {
            assert_eq!(
                texts.iter().filter(|t| **t == header.to_uppercase()).count(),
                1,
                "{header}"
            );
        }
        let bands = layout
            .body_items()
            .filter(|item| matches!(item, PlacedItem::Fill { .. }))
            .count();
        assert_eq!(bands, 6);
        assert!(texts.iter().all(|t| !t.contains("**")));
    }

    #[test]
    fn test_chart_placed_once_after_quantitative_data() {
        let layout = layout_report("AAPL", &report(3), Some(&chart()));
        let items: Vec<&PlacedItem> = layout.body_items().collect();

        let images: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches!(item, PlacedItem::Image { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(images.len(), 1);

        let position = |title: &str| items.iter().position(|item| item.text() == Some(title));
        let quant = position("QUANTITATIVE DATA").unwrap();
        let risk = position("RISK FACTORS").unwrap();
        assert!(quant < images[0] && images[0] < risk);
        // Only the section's own body lines sit between its title and the chart
        assert_eq!(images[0] - quant, 4);

        if let PlacedItem::Image { width, height, x, .. } = items[images[0]] {
            assert!((width - CHART_WIDTH_MM).abs() < f32::EPSILON);
            assert!((height - 120.0).abs() < 0.01);
            assert!((x - CHART_X_MM).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_chart_skipped_without_anchor_section() {
        let layout = layout_report("AAPL", "### Executive Summary\nShort.", Some(&chart()));
        assert!(
            !layout
                .body_items()
                .any(|item| matches!(item, PlacedItem::Image { .. }))
        );
    }

    #[test]
    fn test_long_report_paginates_within_margins() {
        let layout = layout_report("AAPL", &report(40), Some(&chart()));

        assert!(layout.pages.len() > 2);
        for (index, page) in layout.pages.iter().enumerate() {
            assert_eq!(page.number, index + 1);
            assert!(
                page.body.iter().all(|item| item.bottom() <= BODY_BOTTOM_MM + 0.01),
                "page {} overflows",
                page.number
            );
            assert!(page.body.iter().all(|item| match item {
                PlacedItem::Text { y, .. } => *y >= BODY_TOP_MM,
                _ => true,
            }));
        }
    }

    #[test]
    fn test_every_page_has_header_and_footer() {
        let layout = layout_report("AAPL", &report(40), None);

        for page in &layout.pages {
            let header: Vec<&str> = page.header.iter().filter_map(PlacedItem::text).collect();
            assert_eq!(header, vec![HEADER_TITLE, HEADER_SUBTITLE]);
            for item in &page.header {
                if let PlacedItem::Text { x, .. } = item {
                    assert_eq!(*x, SIDE_MARGIN_MM);
                }
            }

            let footer: Vec<&str> = page.footer.iter().filter_map(PlacedItem::text).collect();
            assert_eq!(footer.last().copied(), Some(format!("Page {}", page.number).as_str()));
            assert_eq!(footer[..footer.len() - 1].join(" "), DISCLAIMER);
            assert!(page.footer.iter().all(|item| item.bottom() <= PAGE_HEIGHT_MM - 10.0));
        }
    }

    #[test]
    fn test_untitled_text_and_empty_report() {
        let layout = layout_report("MELI", "Plain text without headers.", None);
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(texts(&layout)[1], "Plain text without headers.");
        assert!(
            !layout
                .body_items()
                .any(|item| matches!(item, PlacedItem::Fill { .. }))
        );

        let layout = layout_report("MELI", "", None);
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.pages[0].footer.len(), 3);
    }
}
