//! Durable ingestion progress ledger.
//!
//! The ledger is the crash-safety anchor of the pipeline: a document id is
//! present iff all of that document's chunks were embedded and stored. The
//! persisted form is a small JSON file that is atomically replaced on every
//! append, never left half-written.

use crate::error::{MinneError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Persisted ledger shape: `{"processed_videos": ["id", ...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    processed_videos: Vec<String>,
}

/// Record of which documents have been fully ingested.
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    processed: Vec<String>,
}

impl ProgressLedger {
    /// Load the ledger from disk, or start empty if no file exists yet.
    pub fn load(path: &Path) -> Result<Self> {
        let processed = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let file: LedgerFile = serde_json::from_str(&content)?;
            file.processed_videos
        } else {
            Vec::new()
        };

        debug!("Loaded ledger with {} processed documents", processed.len());

        Ok(Self {
            path: path.to_path_buf(),
            processed,
        })
    }

    /// Whether a document has already been fully ingested.
    pub fn is_processed(&self, document_id: &str) -> bool {
        self.processed.iter().any(|id| id == document_id)
    }

    /// Number of documents recorded as processed.
    pub fn len(&self) -> usize {
        self.processed.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    /// Mark a document as fully processed and flush to disk before
    /// returning. Marking an id already present is a no-op.
    pub fn mark_processed(&mut self, document_id: &str) -> Result<()> {
        if self.is_processed(document_id) {
            return Ok(());
        }

        self.processed.push(document_id.to_string());
        self.flush()?;

        info!("Checkpointed document {}", document_id);
        Ok(())
    }

    /// Atomically rewrite the ledger file: write a sibling temp file, fsync,
    /// then rename over the target.
    fn flush(&self) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| MinneError::Ledger(format!("Ledger path {} has no parent", self.path.display())))?;
        std::fs::create_dir_all(parent)?;

        let file = LedgerFile {
            processed_videos: self.processed.clone(),
        };
        let json = serde_json::to_string(&file)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| MinneError::Ledger(format!("Failed to replace ledger: {}", e)))?;

        Ok(())
    }

    /// Delete the persisted ledger file. Called only when a run fully
    /// completes; a crash mid-run must leave the file for resumption.
    pub fn remove_file(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Path of the persisted ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
