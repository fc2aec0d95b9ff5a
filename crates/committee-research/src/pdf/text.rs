//! Text cleanup and wrapping for the built-in PDF fonts

/// Millimetres per typographic point
pub const MM_PER_PT: f32 = 0.3528;

/// Average Helvetica glyph width as a fraction of the font size
const AVG_GLYPH_EM: f32 = 0.5;

/// Strip markdown emphasis, normalise bullets and fold to ASCII
pub fn clean_body(text: &str) -> String {
    let text = text.replace("**", "").replace("__", "");
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            match trimmed.strip_prefix("* ") {
                Some(rest) => format!("- {rest}"),
                None => trimmed.to_string(),
            }
        })
        .collect();
    fold_to_ascii(lines.join("\n").trim())
}

/// Replace characters the built-in fonts cannot encode
pub fn fold_to_ascii(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            ' '..='~' | '\n' => folded.push(ch),
            '\t' | '\u{a0}' | '\u{2002}'..='\u{200a}' => folded.push(' '),
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{2032}' => folded.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{2033}' => folded.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => folded.push('-'),
            '\u{2022}' | '\u{25aa}' | '\u{25cf}' => folded.push('-'),
            '\u{2026}' => folded.push_str("..."),
            '\u{20ac}' => folded.push_str("EUR"),
            '\u{a3}' => folded.push_str("GBP"),
            '\u{a5}' => folded.push_str("JPY"),
            '\u{a9}' => folded.push_str("(c)"),
            '\u{ae}' => folded.push_str("(R)"),
            '\u{2122}' => folded.push_str("TM"),
            '\u{b0}' => folded.push_str(" deg"),
            '\u{d7}' => folded.push('x'),
            '\u{2248}' => folded.push('~'),
            '\u{2264}' => folded.push_str("<="),
            '\u{2265}' => folded.push_str(">="),
            '\u{2191}' => folded.push_str("up"),
            '\u{2193}' => folded.push_str("down"),
            '\u{2192}' => folded.push_str("->"),
            '\r' | '\u{200b}' | '\u{feff}' => {}
            other => folded.push(latin_base(other).unwrap_or('?')),
        }
    }
    folded
}

fn latin_base(ch: char) -> Option<char> {
    let base = match ch {
        'à'..='å' => 'a',
        'À'..='Å' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'è'..='ë' => 'e',
        'È'..='Ë' => 'E',
        'ì'..='ï' => 'i',
        'Ì'..='Ï' => 'I',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ò'..='ö' | 'ø' => 'o',
        'Ò'..='Ö' | 'Ø' => 'O',
        'ù'..='ü' => 'u',
        'Ù'..='Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        _ => return None,
    };
    Some(base)
}

/// Approximate rendered width of `text` in millimetres
pub fn text_width_mm(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * char_width_mm(font_size)
}

fn char_width_mm(font_size: f32) -> f32 {
    font_size * AVG_GLYPH_EM * MM_PER_PT
}

/// Greedy word wrap to `max_width_mm`
///
/// Blank input lines are kept as empty strings so paragraph breaks survive.
/// Words longer than a line are split.
pub fn wrap_text(text: &str, font_size: f32, max_width_mm: f32) -> Vec<String> {
    let max_chars = ((max_width_mm / char_width_mm(font_size)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word;
            while word.chars().count() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split = word
                    .char_indices()
                    .nth(max_chars)
                    .map_or(word.len(), |(idx, _)| idx);
                lines.push(word[..split].to_string());
                word = &word[split..];
            }
            if word.is_empty() {
                continue;
            }

            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_body() {
        let cleaned = clean_body("  **Revenue** grew.\n* iPhone up\n  * Services up\n__Note__ ");
        assert_eq!(cleaned, "Revenue grew.\n- iPhone up\n- Services up\nNote");
    }

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(
            fold_to_ascii("Apple\u{2019}s \u{201c}AI\u{201d} push \u{2014} \u{20ac}5bn\u{2026}"),
            "Apple's \"AI\" push - EUR5bn..."
        );
        assert_eq!(fold_to_ascii("Nestl\u{e9} S.A."), "Nestle S.A.");
        assert_eq!(fold_to_ascii("\u{4e2d}"), "?");
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "The company reported record services revenue and reiterated guidance for the next fiscal year.";
        let lines = wrap_text(text, 11.0, 60.0);

        let max_chars = (60.0 / char_width_mm(11.0)).floor() as usize;
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| line.chars().count() <= max_chars));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_keeps_paragraph_breaks_and_splits_long_words() {
        let lines = wrap_text("first\n\nsecond", 11.0, 190.0);
        assert_eq!(lines, vec!["first", "", "second"]);

        let lines = wrap_text(&"x".repeat(50), 10.0, 20.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "x".repeat(50));
    }
}
