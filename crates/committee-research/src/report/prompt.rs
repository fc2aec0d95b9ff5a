//! Research-note prompt template

use super::sections::REPORT_SECTIONS;
use crate::error::Result;
use minijinja::{Environment, context};

const REPORT_TEMPLATE: &str = "\
You are a Senior Investment Banker.
Write a professional equity research report for: {{ ticker }}.

DATA: {{ data }}
NEWS: {{ news }}

Structure using EXACTLY these Markdown headers:
{% for header in headers %}### {{ header }}
{% endfor %}";

/// Render the prompt for one ticker
pub fn render_report_prompt(ticker: &str, data: &str, news: &str) -> Result<String> {
    let env = Environment::new();
    let prompt = env.render_str(
        REPORT_TEMPLATE,
        context! {
            ticker => ticker,
            data => data,
            news => news,
            headers => REPORT_SECTIONS.to_vec(),
        },
    )?;
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_inputs_and_headers() {
        let prompt = render_report_prompt(
            "AAPL",
            "--- INFO ---\nCompany: Apple Inc.",
            "- Apple & partners: AI deal",
        )
        .unwrap();

        assert!(prompt.starts_with("You are a Senior Investment Banker."));
        assert!(prompt.contains("equity research report for: AAPL."));
        assert!(prompt.contains("DATA: --- INFO ---\nCompany: Apple Inc."));
        // No HTML escaping in plain-text prompts
        assert!(prompt.contains("NEWS: - Apple & partners: AI deal"));

        let headers: Vec<&str> = prompt
            .lines()
            .filter_map(|line| line.strip_prefix("### "))
            .collect();
        assert_eq!(headers, REPORT_SECTIONS);
    }
}
