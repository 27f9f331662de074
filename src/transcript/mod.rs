//! Transcript source abstraction.
//!
//! A transcript source resolves a document id to its full raw text. The
//! fetch itself is an external collaborator; the pipeline only cares about
//! the distinction between "the source has no transcript for this document"
//! (a soft failure) and transport errors.

mod youtube;

pub use youtube::YoutubeTranscriptSource;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the full transcript text for a document.
    ///
    /// Returns `MinneError::TranscriptUnavailable` when the source reports
    /// that no transcript exists (disabled captions, removed video), and
    /// `MinneError::Fetch` for transport-level failures. Both are soft from
    /// the pipeline's perspective.
    async fn fetch_transcript(&self, document_id: &str) -> Result<String>;
}
