//! Metric-name catalog.
//!
//! Maps natural-language metric phrasings ("revenue", "net income") to
//! the canonical metric names used by the structured KPI table. Longer
//! phrases match first so "operating income" never decomposes into a
//! spurious "income" match; leftover words get one fuzzy pass for typo
//! tolerance.

use crate::fuzzy;

/// Words never considered metric mentions on their own.
const STOPWORDS: &[&str] = &[
    "the", "and", "what", "how", "was", "is", "are", "were", "from", "with",
];

/// Phrase-to-canonical metric mapping with exact and fuzzy lookup.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    /// (phrase, canonical name), sorted by phrase length descending.
    entries: Vec<(String, String)>,
    fuzzy_threshold: f32,
}

impl Default for MetricCatalog {
    /// The built-in catalog covering the standard financial-statement
    /// metrics present in the KPI table.
    fn default() -> Self {
        Self::new(
            [
                ("revenue", "income_stmt_Revenue"),
                ("revenues", "income_stmt_Revenue"),
                ("total revenue", "income_stmt_Revenue"),
                ("net sales", "income_stmt_Revenue"),
                ("sales", "income_stmt_Revenue"),
                ("top line", "income_stmt_Revenue"),
                ("net income", "income_stmt_Net Income"),
                ("net earnings", "income_stmt_Net Income"),
                ("earnings", "income_stmt_Net Income"),
                ("profit", "income_stmt_Net Income"),
                ("net profit", "income_stmt_Net Income"),
                ("bottom line", "income_stmt_Net Income"),
                ("gross profit", "income_stmt_Gross Profit"),
                ("gross margin", "Gross Profit Margin %"),
                ("operating income", "income_stmt_Operating Income"),
                ("operating expenses", "income_stmt_Operating Expenses"),
                ("cost of revenue", "income_stmt_Cost of Revenue"),
                ("cost of goods sold", "income_stmt_Cost of Revenue"),
                ("interest expense", "income_stmt_Interest Expense"),
                ("income tax", "income_stmt_Provision for Income Tax"),
                ("eps", "EPS"),
                ("earnings per share", "EPS"),
                ("total assets", "balance_sheet_Total Assets"),
                ("assets", "balance_sheet_Total Assets"),
                ("total liabilities", "balance_sheet_Total Liabilities"),
                ("liabilities", "balance_sheet_Total Liabilities"),
                ("current assets", "balance_sheet_Current Assets"),
                ("current liabilities", "balance_sheet_Current Liabilities"),
                ("stockholders equity", "balance_sheet_Stockholders Equity"),
                ("shareholders equity", "balance_sheet_Stockholders Equity"),
                ("equity", "balance_sheet_Stockholders Equity"),
                ("operating cash flow", "cash_flow_Operating Cash Flow"),
                ("cash flow from operations", "cash_flow_Operating Cash Flow"),
                ("investing cash flow", "cash_flow_Investing Cash Flow"),
                ("financing cash flow", "cash_flow_Financing Cash Flow"),
                ("return on assets", "Return on Assets (ROA) %"),
                ("roa", "Return on Assets (ROA) %"),
            ]
            .into_iter()
            .map(|(p, c)| (p.to_string(), c.to_string())),
        )
    }
}

impl MetricCatalog {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(p, c)| (p.to_lowercase(), c))
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(&b.0)));
        Self {
            entries,
            fuzzy_threshold: 0.7,
        }
    }

    pub fn with_fuzzy_threshold(mut self, threshold: f32) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extract canonical metric names mentioned in `text`, deduped and
    /// sorted for stability.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut found: Vec<String> = Vec::new();
        let mut matched_spans: Vec<(usize, usize)> = Vec::new();
        let mut matched_words: Vec<&str> = Vec::new();

        // Exact phrase pass, longest phrases first so a multi-word
        // phrase claims its span before any sub-phrase can.
        for (phrase, canonical) in &self.entries {
            for span in word_bounded_matches(&lowered, phrase) {
                let overlaps = matched_spans
                    .iter()
                    .any(|&(s, e)| span.0 < e && span.1 > s);
                if overlaps {
                    continue;
                }
                matched_spans.push(span);
                matched_words.extend(phrase.split_whitespace());
                if !found.contains(canonical) {
                    found.push(canonical.clone());
                }
            }
        }

        // Fuzzy pass over leftover words for typo tolerance.
        for word in lowered.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            if word.len() < 4
                || matched_words.contains(&word)
                || STOPWORDS.contains(&word)
                || word.bytes().all(|b| b.is_ascii_digit())
            {
                continue;
            }
            if let Some((phrase, _)) = fuzzy::best_match(
                word,
                self.entries.iter().map(|(p, _)| p.as_str()),
                self.fuzzy_threshold,
            ) && let Some((_, canonical)) = self.entries.iter().find(|(p, _)| p == phrase)
                && !found.contains(canonical)
            {
                found.push(canonical.clone());
            }
        }

        found.sort();
        found.dedup();
        found
    }
}

/// Byte spans where `phrase` occurs in `haystack` on word boundaries.
fn word_bounded_matches(haystack: &str, phrase: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(phrase) {
        let start = from + rel;
        let end = start + phrase.len();
        let left_ok = start == 0
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let right_ok = end == haystack.len()
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
        if left_ok && right_ok {
            spans.push((start, end));
        }
        from = start + 1;
    }
    spans
}
