//! Service client implementations for FinSight.
//!
//! HTTP clients for the vector index, embedding service, generation
//! service and sentence table, plus local stores for the KPI table and
//! test corpora. Every client maps response statuses onto the shared
//! error taxonomy: 429 is rate limiting, 401/403 authentication, other
//! non-200 an API error, transport failures a network error.

pub mod embed_http;
pub mod generate_http;
mod http;
pub mod kpi_file;
pub mod sentence_http;
pub mod sentence_memory;
pub mod vector_http;

pub use embed_http::HttpEmbedder;
pub use generate_http::HttpGenerator;
pub use kpi_file::JsonKpiStore;
pub use sentence_http::HttpSentenceStore;
pub use sentence_memory::InMemorySentenceStore;
pub use vector_http::HttpVectorSearch;
