//! The static company alias table.
//!
//! Loaded once at construction into an immutable, explicitly-passed
//! structure; no ambient lookups happen during query processing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One company row from the canonical dimension table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Canonical numeric key (SEC CIK).
    pub cik: u64,

    /// Canonical company name ("NVIDIA CORP").
    pub name: String,

    /// Exchange ticker, if listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,

    /// Additional alias tokens ("nvidia", "apple", ...), lowercase.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// Immutable lookup structure over the company table.
///
/// Built once; the resolver borrows it for every query. Tickers map
/// uniquely; an alias token may map to several companies (ambiguity is
/// surfaced, not resolved here).
#[derive(Debug, Clone)]
pub struct AliasTable {
    companies: Vec<CompanyRecord>,
    by_ticker: HashMap<String, usize>,
    by_cik: HashMap<u64, usize>,
    by_alias: HashMap<String, Vec<usize>>,
}

impl AliasTable {
    /// Build the table from company records. Alias tokens are derived
    /// from explicit aliases plus the name's leading token, all
    /// lowercased.
    pub fn new(companies: Vec<CompanyRecord>) -> Self {
        let mut by_ticker = HashMap::new();
        let mut by_cik = HashMap::new();
        let mut by_alias: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, company) in companies.iter().enumerate() {
            if let Some(ticker) = &company.ticker {
                by_ticker.insert(ticker.to_uppercase(), idx);
            }
            by_cik.insert(company.cik, idx);

            let mut tokens: Vec<String> =
                company.aliases.iter().map(|a| a.to_lowercase()).collect();
            // The name's first alphanumeric token is an implicit alias
            // ("NVIDIA CORP" → "nvidia"), unless it is a generic word.
            if let Some(first) = company
                .name
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .find(|t| t.len() >= 3)
            {
                tokens.push(first.to_string());
            }

            for token in tokens {
                let entry = by_alias.entry(token).or_default();
                if !entry.contains(&idx) {
                    entry.push(idx);
                }
            }
        }

        Self {
            companies,
            by_ticker,
            by_cik,
            by_alias,
        }
    }

    /// Load the table from a JSON array of [`CompanyRecord`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let companies: Vec<CompanyRecord> = serde_json::from_str(json)?;
        Ok(Self::new(companies))
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Exact ticker lookup (case-normalized).
    pub fn by_ticker(&self, ticker: &str) -> Option<&CompanyRecord> {
        self.by_ticker
            .get(&ticker.to_uppercase())
            .map(|&i| &self.companies[i])
    }

    /// Exact CIK lookup.
    pub fn by_cik(&self, cik: u64) -> Option<&CompanyRecord> {
        self.by_cik.get(&cik).map(|&i| &self.companies[i])
    }

    /// Companies registered under an alias token (may be several).
    pub fn by_alias(&self, token: &str) -> Vec<&CompanyRecord> {
        self.by_alias
            .get(&token.to_lowercase())
            .map(|ids| ids.iter().map(|&i| &self.companies[i]).collect())
            .unwrap_or_default()
    }

    /// All alias tokens, for the fuzzy tier.
    pub fn alias_tokens(&self) -> impl Iterator<Item = &str> {
        self.by_alias.keys().map(String::as_str)
    }
}
