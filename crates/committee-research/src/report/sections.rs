//! Markdown section parsing for generated reports

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Section headers every report must carry, in order
pub const REPORT_SECTIONS: [&str; 6] = [
    "Executive Summary",
    "Company Profile",
    "Market Analysis",
    "Quantitative Data",
    "Risk Factors",
    "Legal Notice",
];

/// Section after which the chart is placed
pub const CHART_ANCHOR_SECTION: &str = "Quantitative Data";

/// One `###` segment of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Header text; `None` for text before the first header
    pub title: Option<String>,
    pub body: String,
}

impl Section {
    /// Whether the title names `header`, ignoring case
    pub fn is_titled(&self, header: &str) -> bool {
        self.title
            .as_deref()
            .is_some_and(|title| title.to_lowercase().contains(&header.to_lowercase()))
    }
}

/// Split markdown on `###` headers at line starts
///
/// Whitespace-only segments are dropped. A segment's first line is its
/// title; the rest is its body.
pub fn split_sections(markdown: &str) -> Vec<Section> {
    let Ok(header_re) = Regex::new(r"(?m)^[ \t]*###[ \t]+") else {
        return vec![Section {
            title: None,
            body: markdown.trim().to_string(),
        }];
    };

    let mut sections = Vec::new();
    let mut markers = header_re.find_iter(markdown).peekable();

    let preamble_end = markers.peek().map_or(markdown.len(), regex::Match::start);
    let preamble = markdown[..preamble_end].trim();
    if !preamble.is_empty() {
        sections.push(Section {
            title: None,
            body: preamble.to_string(),
        });
    }

    while let Some(marker) = markers.next() {
        let end = markers.peek().map_or(markdown.len(), regex::Match::start);
        let segment = &markdown[marker.end()..end];
        if segment.trim().is_empty() {
            continue;
        }

        let (title, body) = segment.split_once('\n').unwrap_or((segment, ""));
        let title = clean_title(title);
        sections.push(Section {
            title: (!title.is_empty()).then_some(title),
            body: body.trim().to_string(),
        });
    }

    sections
}

/// Required headers absent from `markdown`
pub fn missing_sections(markdown: &str) -> Vec<&'static str> {
    let sections = split_sections(markdown);
    REPORT_SECTIONS
        .into_iter()
        .filter(|header| !sections.iter().any(|s| s.is_titled(header)))
        .collect()
}

fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_end_matches('#')
        .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
### Executive Summary
Apple remains a **high-quality** franchise.

### Company Profile
Consumer electronics and services.

### Market Analysis
* Premium smartphone share is stable.
* Services keep growing.

### Quantitative Data
Price: $194.35, above the 20-day SMA.

### Risk Factors
Regulatory pressure on the App Store.

### Legal Notice
Informational only.
";

    #[test]
    fn test_compliant_report_has_six_sections() {
        let sections = split_sections(REPORT);

        assert_eq!(sections.len(), 6);
        for (section, header) in sections.iter().zip(REPORT_SECTIONS) {
            assert_eq!(section.title.as_deref(), Some(header));
            assert!(!section.body.is_empty());
        }
        assert!(missing_sections(REPORT).is_empty());
    }

    #[test]
    fn test_preamble_becomes_untitled_section() {
        let sections = split_sections("Prepared for the committee.\n\n### Risk Factors\nFX.");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, None);
        assert_eq!(sections[0].body, "Prepared for the committee.");
        assert_eq!(sections[1].title.as_deref(), Some("Risk Factors"));
        assert_eq!(sections[1].body, "FX.");
    }

    #[test]
    fn test_titles_are_cleaned() {
        let sections = split_sections("### **Quantitative Data** ###\nNumbers.");
        assert_eq!(sections[0].title.as_deref(), Some("Quantitative Data"));
        assert!(sections[0].is_titled("quantitative data"));
    }

    #[test]
    fn test_inline_hashes_do_not_split() {
        let sections = split_sections("### Market Analysis\nTicker tag ### inline stays.");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "Ticker tag ### inline stays.");
    }

    #[test]
    fn test_missing_sections() {
        let missing = missing_sections("### Executive Summary\nShort.\n### Risk Factors\nMany.");
        assert_eq!(
            missing,
            vec![
                "Company Profile",
                "Market Analysis",
                "Quantitative Data",
                "Legal Notice"
            ]
        );
        assert_eq!(missing_sections("").len(), 6);
    }
}
