//! Error types for Minne.

use thiserror::Error;

/// Library-level error type for Minne operations.
///
/// The variants fall into four classes that the ingestion pipeline treats
/// differently: configuration errors are fatal at startup, fetch errors are
/// soft (the document is skipped and the run continues), provider and store
/// errors abort the current document or query but never the whole run.
#[derive(Error, Debug)]
pub enum MinneError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcript fetch failed: {0}")]
    Fetch(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Progress ledger error: {0}")]
    Ledger(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl MinneError {
    /// Whether this error is a soft fetch failure: the source reported the
    /// transcript missing or the fetch itself failed. Soft failures skip the
    /// document without aborting the run.
    pub fn is_soft_fetch(&self) -> bool {
        matches!(
            self,
            MinneError::Fetch(_) | MinneError::TranscriptUnavailable(_)
        )
    }
}

/// Result type alias for Minne operations.
pub type Result<T> = std::result::Result<T, MinneError>;
