//! In-memory sentence store for local corpora and tests.

use std::collections::HashMap;

use async_trait::async_trait;

use finsight_core::{SentenceRecord, SentenceStore, ServiceError};

/// Sentence table held in memory, keyed by (document, section).
#[derive(Debug, Default)]
pub struct InMemorySentenceStore {
    sections: HashMap<(String, String), Vec<SentenceRecord>>,
}

impl InMemorySentenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert records; each section's rows are kept sorted by position.
    pub fn insert(&mut self, records: impl IntoIterator<Item = SentenceRecord>) {
        for record in records {
            let key = (record.document_id.clone(), record.section_id.clone());
            self.sections.entry(key).or_default().push(record);
        }
        for rows in self.sections.values_mut() {
            rows.sort_by_key(|r| r.sentence_index);
        }
    }

    /// Build a uniform section of numbered sentences (test corpora).
    pub fn with_section(
        document_id: &str,
        section_id: &str,
        fiscal_year: i32,
        sentences: &[&str],
    ) -> Self {
        let section_len = sentences.len() as u32;
        let mut store = Self::new();
        store.insert(sentences.iter().enumerate().map(|(i, text)| SentenceRecord {
            document_id: document_id.into(),
            section_id: section_id.into(),
            sentence_index: i as u32,
            fiscal_year,
            section_len,
            text: text.to_string(),
        }));
        store
    }
}

#[async_trait]
impl SentenceStore for InMemorySentenceStore {
    async fn fetch_range(
        &self,
        document_id: &str,
        section_id: &str,
        start: u32,
        end: u32,
    ) -> Result<Vec<SentenceRecord>, ServiceError> {
        let key = (document_id.to_string(), section_id.to_string());
        Ok(self
            .sections
            .get(&key)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.sentence_index >= start && r.sentence_index <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
