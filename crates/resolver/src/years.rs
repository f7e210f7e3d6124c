//! Fiscal-year extraction from free-form question text.
//!
//! Recognizes standalone four-digit years (19xx/20xx) and year ranges
//! joined by "to" or a dash; ranges are expanded to every year they
//! cover. Years beyond the current calendar year are kept but flagged
//! with a warning, since filings for them cannot exist yet.

use chrono::Datelike;
use finsight_core::YearHints;

/// Extracts fiscal-year hints from question text.
#[derive(Debug, Clone)]
pub struct YearExtractor {
    /// Upper bound for plausible filing years (usually the current
    /// calendar year).
    current_year: i32,
}

impl Default for YearExtractor {
    fn default() -> Self {
        Self {
            current_year: chrono::Utc::now().year(),
        }
    }
}

impl YearExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the current-year bound (tests, replay).
    pub fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Extract all year mentions, range-expanded, sorted and deduped.
    pub fn extract(&self, text: &str) -> YearHints {
        let tokens = tokenize(text);
        let mut years: Vec<i32> = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            let Some(start) = as_year(&tokens[i]) else {
                i += 1;
                continue;
            };

            // Range form: "2018 to 2020", "2018 - 2020". A bare pair of
            // years without a joiner is two separate mentions.
            if i + 2 < tokens.len()
                && is_range_joiner(&tokens[i + 1])
                && let Some(end) = as_year(&tokens[i + 2])
                && end >= start
            {
                years.extend(start..=end);
                i += 3;
                continue;
            }

            years.push(start);
            i += 1;
        }

        years.sort_unstable();
        years.dedup();

        let warning = years
            .iter()
            .any(|&y| y > self.current_year)
            .then(|| format!("question mentions years after {}", self.current_year));

        YearHints { years, warning }
    }
}

/// Split into word tokens, keeping dash characters as their own tokens
/// so "2018-2020" and "2018 – 2020" both parse as ranges.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_alphanumeric() {
            current.push(c);
        } else {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            if is_dash(c) {
                tokens.push(c.to_string());
            }
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_dash(c: char) -> bool {
    matches!(c, '-' | '\u{2013}' | '\u{2014}')
}

fn is_range_joiner(token: &str) -> bool {
    token.eq_ignore_ascii_case("to") || (token.chars().count() == 1 && token.chars().all(is_dash))
}

/// A token is a year iff it is exactly four digits starting 19 or 20.
/// Longer digit runs (CIKs, dollar amounts) are never years.
fn as_year(token: &str) -> Option<i32> {
    if token.len() != 4 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !(token.starts_with("19") || token.starts_with("20")) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> YearExtractor {
        YearExtractor::with_current_year(2026)
    }

    #[test]
    fn single_year() {
        let hints = extractor().extract("What was NVIDIA's revenue in 2020?");
        assert_eq!(hints.years, vec![2020]);
        assert!(hints.warning.is_none());
    }

    #[test]
    fn range_with_to_is_expanded() {
        let hints = extractor().extract("revenue from 2018 to 2021");
        assert_eq!(hints.years, vec![2018, 2019, 2020, 2021]);
    }

    #[test]
    fn range_with_dash_is_expanded() {
        for text in ["2018-2020", "2018 - 2020", "2018\u{2013}2020", "2018\u{2014}2020"] {
            let hints = extractor().extract(text);
            assert_eq!(hints.years, vec![2018, 2019, 2020], "input: {text}");
        }
    }

    #[test]
    fn separate_mentions_sorted_and_deduped() {
        let hints = extractor().extract("compare 2021 with 2019 and again 2021");
        assert_eq!(hints.years, vec![2019, 2021]);
    }

    #[test]
    fn digit_runs_that_are_not_years() {
        let hints = extractor().extract("CIK 1045810 spent $20200 in Q3");
        assert!(hints.is_empty());
    }

    #[test]
    fn nineteen_hundreds_accepted() {
        let hints = extractor().extract("filings since 1998");
        assert_eq!(hints.years, vec![1998]);
    }

    #[test]
    fn future_year_is_flagged() {
        let hints = extractor().extract("projected revenue for 2030");
        assert_eq!(hints.years, vec![2030]);
        assert!(hints.warning.is_some());
    }

    #[test]
    fn inverted_range_treated_as_two_mentions() {
        let hints = extractor().extract("2021 to 2018");
        assert_eq!(hints.years, vec![2018, 2021]);
    }

    #[test]
    fn no_years() {
        let hints = extractor().extract("what are the main risk factors?");
        assert!(hints.is_empty());
        assert!(hints.range().is_none());
    }
}
