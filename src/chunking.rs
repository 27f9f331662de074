//! Word-window chunking of transcript text.
//!
//! Transcripts are split into bounded-size segments measured in
//! whitespace-delimited words. The partition is ordered, gapless and
//! non-overlapping, so joining the chunks back together reproduces the
//! original word sequence exactly.

use crate::error::{MinneError, Result};
use serde::{Deserialize, Serialize};

/// A chunk of transcript text, the unit of embedding and storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    /// Zero-based position of this chunk within its document.
    pub ordinal: usize,
    /// Text content of this chunk.
    pub content: String,
}

impl TextChunk {
    /// Derive the stable store identifier for this chunk.
    ///
    /// Re-ingesting the same document with the same chunking yields the same
    /// ids, which is what makes upserts idempotent across runs.
    pub fn store_id(&self, document_id: &str) -> String {
        format!("{}_chunk_{}", document_id, self.ordinal)
    }
}

/// Split text into chunks of at most `max_words` whitespace-delimited words.
///
/// The final chunk may be shorter. Empty or whitespace-only input yields an
/// empty sequence. Deterministic for a given input and size. A zero window
/// is rejected; `max_words` can come straight from user configuration.
pub fn chunk_words(text: &str, max_words: usize) -> Result<Vec<TextChunk>> {
    if max_words == 0 {
        return Err(MinneError::InvalidInput(
            "chunking max_words must be a positive integer".to_string(),
        ));
    }

    let words: Vec<&str> = text.split_whitespace().collect();

    Ok(words
        .chunks(max_words)
        .enumerate()
        .map(|(ordinal, window)| TextChunk {
            ordinal,
            content: window.join(" "),
        })
        .collect())
}
