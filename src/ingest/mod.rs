//! Transcript ingestion: manifest parsing, progress ledger, and the
//! document pipeline.
//!
//! Ingestion is resumable and idempotent: the ledger records which document
//! ids have been fully chunked, embedded and stored, and a re-run skips
//! them. A document is only marked processed after every one of its chunks
//! is durably in the vector store.

mod ledger;
mod manifest;
mod pipeline;

pub use ledger::ProgressLedger;
pub use manifest::{extract_document_id, sanitize_title, ManifestEntry, read_manifest};
pub use pipeline::{FailedDocument, IngestPipeline, IngestedDocument, RunReport};
