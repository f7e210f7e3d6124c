//! Error types for the FinSight domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all FinSight operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- External service errors ---
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from any consumed external service (vector search, embedding,
/// language generation, sentence metadata, KPI store).
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by service, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service not configured: {0}")]
    NotConfigured(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Query embedding failed for every variant: {0}")]
    EmbeddingFailed(String),

    #[error("All retrieval paths failed: {0}")]
    AllPathsFailed(String),
}
