//! The ingestion pipeline.
//!
//! Processes every manifest entry sequentially: fetch transcript, archive
//! it, chunk, embed, store, then checkpoint the document in the progress
//! ledger. Failures are isolated per document; a fetch or provider error
//! records the document as failed and moves on. The ledger is only written
//! after all of a document's chunks are durably upserted.

use crate::chunking::chunk_words;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::ingest::ledger::ProgressLedger;
use crate::ingest::manifest::{extract_document_id, read_manifest, sanitize_title, ManifestEntry};
use crate::transcript::{TranscriptSource, YoutubeTranscriptSource};
use crate::vector_store::{ChunkRecord, SqliteVectorStore, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A document that completed ingestion in this run.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    /// Manifest title.
    pub title: String,
    /// Derived document id.
    pub document_id: String,
    /// Number of chunks embedded and stored.
    pub chunks: usize,
}

/// A document that failed during this run.
#[derive(Debug, Clone)]
pub struct FailedDocument {
    /// Manifest title.
    pub title: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Outcome summary of an ingestion run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Documents fully ingested this run.
    pub succeeded: Vec<IngestedDocument>,
    /// Documents that failed this run.
    pub failed: Vec<FailedDocument>,
    /// Documents skipped because the ledger already had them.
    pub skipped: usize,
}

impl RunReport {
    /// Number of documents actually attempted (skipped ones excluded).
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Total chunks stored across all successes.
    pub fn total_chunks(&self) -> usize {
        self.succeeded.iter().map(|d| d.chunks).sum()
    }
}

/// The ingestion pipeline. Owns ledger mutation exclusively; the vector
/// store handle is explicit and shared with the query path.
pub struct IngestPipeline {
    source: Arc<dyn TranscriptSource>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    manifest_path: PathBuf,
    ledger_path: PathBuf,
    transcripts_dir: PathBuf,
    archive_prefix: String,
    max_chunk_words: usize,
}

impl IngestPipeline {
    /// Create a pipeline from settings, with the default providers.
    pub fn new(settings: &Settings) -> Result<Self> {
        let source = Arc::new(YoutubeTranscriptSource::new(&settings.ingest.language));
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
            settings.request_timeout(),
        ));
        let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);

        Ok(Self::with_components(settings, source, embedder, store))
    }

    /// Create a pipeline with custom components (used by tests).
    pub fn with_components(
        settings: &Settings,
        source: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            source,
            embedder,
            store,
            manifest_path: settings.manifest_path(),
            ledger_path: settings.ledger_path(),
            transcripts_dir: settings.transcripts_dir(),
            archive_prefix: settings.ingest.archive_prefix.clone(),
            max_chunk_words: settings.chunking.max_words,
        }
    }

    /// Run the pipeline over every manifest entry, sequentially.
    ///
    /// Documents already in the ledger are skipped. Per-document failures
    /// are recorded in the report and never abort the run. When all entries
    /// have been attempted, the manifest and ledger file are removed so the
    /// next run starts fresh; a crash mid-run leaves both in place for
    /// resumption.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunReport> {
        let entries = read_manifest(&self.manifest_path)?;
        let mut ledger = ProgressLedger::load(&self.ledger_path)?;
        let mut report = RunReport::default();

        let total = entries.len();
        info!("Starting ingestion run over {} manifest entries", total);

        for (idx, entry) in entries.iter().enumerate() {
            let position = format!("{}/{}", idx + 1, total);

            let Some(document_id) = extract_document_id(&entry.link) else {
                warn!("Invalid source link for '{}': {}", entry.name, entry.link);
                report.failed.push(FailedDocument {
                    title: entry.name.clone(),
                    reason: format!("invalid source link: {}", entry.link),
                });
                continue;
            };

            if ledger.is_processed(&document_id) {
                info!("Skipping already processed document {}: {}", position, entry.name);
                report.skipped += 1;
                continue;
            }

            info!("Processing document {}: {}", position, entry.name);

            match self.ingest_document(&document_id, entry).await {
                Ok(chunks) => {
                    // Checkpoint strictly after every chunk is stored.
                    ledger.mark_processed(&document_id)?;
                    report.succeeded.push(IngestedDocument {
                        title: entry.name.clone(),
                        document_id,
                        chunks,
                    });
                }
                Err(e) => {
                    if e.is_soft_fetch() {
                        info!("Skipping '{}', transcript not available: {}", entry.name, e);
                    } else {
                        warn!("Failed to process '{}': {}", entry.name, e);
                    }
                    report.failed.push(FailedDocument {
                        title: entry.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // The run completed (every entry attempted), so clear transient run
        // state. Individual failures do not keep these files alive.
        self.cleanup_run_state(&ledger)?;

        info!(
            "Run complete: {} succeeded, {} failed, {} skipped",
            report.succeeded.len(),
            report.failed.len(),
            report.skipped
        );

        Ok(report)
    }

    /// Ingest a single document end to end. Returns the number of chunks
    /// stored. Any chunk-level failure removes the document's partial chunk
    /// set before returning, so nothing half-ingested stays queryable.
    async fn ingest_document(&self, document_id: &str, entry: &ManifestEntry) -> Result<usize> {
        let text = self.source.fetch_transcript(document_id).await?;

        self.archive_transcript(&entry.name, &text)?;

        let chunks = chunk_words(&text, self.max_chunk_words)?;

        // Drop any prior chunk set for this document first, so a shorter
        // re-chunking cannot leave stale high-ordinal ids behind.
        self.store.delete_by_document_id(document_id).await?;

        for chunk in &chunks {
            let result = async {
                let embedding = self.embedder.embed(&chunk.content).await?;
                let record = ChunkRecord::from_chunk(document_id, &entry.name, chunk, embedding);
                self.store.upsert(&record).await
            }
            .await;

            if let Err(e) = result {
                // Abort the whole document: no partial chunk set may remain
                // attributed to an unfinished document.
                if let Err(cleanup_err) = self.store.delete_by_document_id(document_id).await {
                    warn!(
                        "Failed to clean up partial chunks for {}: {}",
                        document_id, cleanup_err
                    );
                }
                return Err(e);
            }
        }

        Ok(chunks.len())
    }

    /// Write the raw transcript to the archive directory.
    fn archive_transcript(&self, title: &str, text: &str) -> Result<()> {
        std::fs::create_dir_all(&self.transcripts_dir)?;
        let filename = format!("{}_{}.txt", self.archive_prefix, sanitize_title(title));
        std::fs::write(self.transcripts_dir.join(filename), text)?;
        Ok(())
    }

    /// Remove the manifest and ledger file after a completed run.
    fn cleanup_run_state(&self, ledger: &ProgressLedger) -> Result<()> {
        if self.manifest_path.exists() {
            std::fs::remove_file(&self.manifest_path)?;
        }
        ledger.remove_file()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MinneError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transcript source serving canned texts from memory.
    struct StubSource {
        transcripts: HashMap<String, String>,
    }

    #[async_trait]
    impl TranscriptSource for StubSource {
        async fn fetch_transcript(&self, document_id: &str) -> Result<String> {
            self.transcripts
                .get(document_id)
                .cloned()
                .ok_or_else(|| MinneError::TranscriptUnavailable(document_id.to_string()))
        }
    }

    /// Deterministic embedder that can be made to fail after N calls.
    struct StubEmbedder {
        calls: AtomicUsize,
        fail_after: Option<usize>,
    }

    impl StubEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_after: None,
            }
        }

        fn failing_after(n: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_after: Some(n),
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(limit) = self.fail_after {
                if call >= limit {
                    return Err(MinneError::Embedding("stubbed rate limit".to_string()));
                }
            }
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn test_settings(dir: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.general.data_dir = dir.display().to_string();
        settings.ingest.manifest_path = dir.join("new_links.csv").display().to_string();
        settings.ingest.ledger_path = dir.join("progress.json").display().to_string();
        settings.ingest.transcripts_dir = dir.join("transcripts").display().to_string();
        settings.chunking.max_words = 500;
        settings
    }

    fn write_manifest(settings: &Settings, rows: &[(&str, &str)]) {
        let mut file = std::fs::File::create(settings.manifest_path()).unwrap();
        writeln!(file, "name,link").unwrap();
        for (name, id) in rows {
            writeln!(file, "{},https://youtu.be/{}", name, id).unwrap();
        }
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    fn pipeline_with(
        settings: &Settings,
        transcripts: HashMap<String, String>,
        embedder: StubEmbedder,
    ) -> (IngestPipeline, Arc<SqliteVectorStore>) {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        let pipeline = IngestPipeline::with_components(
            settings,
            Arc::new(StubSource { transcripts }),
            Arc::new(embedder),
            store.clone(),
        );
        (pipeline, store)
    }

    #[tokio::test]
    async fn test_end_to_end_two_documents() {
        let dir = tempfile::tempdir().unwrap();
        let settings = test_settings(dir.path());
        write_manifest(&settings, &[("Long Episode", "aaaaaaaaaaa"), ("Short Episode", "bbbbbbbbbbb")]);

        let mut transcripts = HashMap::new();
        transcripts.insert("aaaaaaaaaaa".to_string(), words(1200));
        transcripts.insert("bbbbbbbbbbb".to_string(), words(50));

        let (pipeline, store) = pipeline_with(&settings, transcripts, StubEmbedder::new());
        let report = pipeline.run().await.unwrap();

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 0);
        assert_eq!(report.succeeded[0].chunks, 3);
        assert_eq!(report.succeeded[1].chunks, 1);
        assert_eq!(store.count().await.unwrap(), 4);

        let ids = store.list_ids().await.unwrap();
        assert!(ids.contains(&"aaaaaaaaaaa_chunk_0".to_string()));
        assert!(ids.contains(&"aaaaaaaaaaa_chunk_2".to_string()));
        assert!(ids.contains(&"bbbbbbbbbbb_chunk_0".to_string()));

        // Transient run state is cleared after a completed run.
        assert!(!settings.manifest_path().exists());
        assert!(!settings.ledger_path().exists());

        // Transcripts are archived under sanitized names.
        assert!(settings
            .transcripts_dir()
            .join("transcript_long_episode.txt")
            .exists());
    }

    #[tokio::test]
    async fn test_resumability_skips_ledgered_documents() {
        let dir = tempfile::tempdir().unwrap();
        let settings = test_settings(dir.path());
        write_manifest(
            &settings,
            &[
                ("One", "aaaaaaaaaaa"),
                ("Two", "bbbbbbbbbbb"),
                ("Three", "ccccccccccc"),
            ],
        );

        // Document two is already checkpointed from a previous run.
        let mut ledger = ProgressLedger::load(&settings.ledger_path()).unwrap();
        ledger.mark_processed("bbbbbbbbbbb").unwrap();

        let mut transcripts = HashMap::new();
        for id in ["aaaaaaaaaaa", "bbbbbbbbbbb", "ccccccccccc"] {
            transcripts.insert(id.to_string(), words(10));
        }

        let (pipeline, store) = pipeline_with(&settings, transcripts, StubEmbedder::new());
        let report = pipeline.run().await.unwrap();

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let settings = test_settings(dir.path());
        write_manifest(&settings, &[("Gone", "aaaaaaaaaaa"), ("Here", "bbbbbbbbbbb")]);

        // Only the second document has a transcript.
        let mut transcripts = HashMap::new();
        transcripts.insert("bbbbbbbbbbb".to_string(), words(20));

        let (pipeline, store) = pipeline_with(&settings, transcripts, StubEmbedder::new());
        let report = pipeline.run().await.unwrap();

        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].title, "Gone");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_document_without_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let settings = test_settings(dir.path());
        write_manifest(&settings, &[("Flaky", "aaaaaaaaaaa"), ("Solid", "bbbbbbbbbbb")]);

        // 600 words -> 2 chunks; the embedder dies on the second call, so
        // the first document fails partway through and the second never gets
        // an embedding either.
        let mut transcripts = HashMap::new();
        transcripts.insert("aaaaaaaaaaa".to_string(), words(600));
        transcripts.insert("bbbbbbbbbbb".to_string(), words(10));

        let (pipeline, store) = pipeline_with(&settings, transcripts, StubEmbedder::failing_after(1));
        let report = pipeline.run().await.unwrap();

        assert_eq!(report.succeeded.len(), 0);
        assert_eq!(report.failed.len(), 2);

        // The aborted document left no partial chunks behind.
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_document_not_in_ledger_mid_run() {
        let dir = tempfile::tempdir().unwrap();
        let settings = test_settings(dir.path());
        write_manifest(&settings, &[("Flaky", "aaaaaaaaaaa"), ("Solid", "bbbbbbbbbbb")]);

        // Embedder fails exactly on its second call: the first document
        // (two chunks) dies partway, the second document's single chunk
        // still succeeds.
        struct FailSecondCall {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl Embedder for FailSecondCall {
            async fn embed(&self, text: &str) -> Result<Vec<f32>> {
                let call = self.calls.fetch_add(1, Ordering::SeqCst);
                if call == 1 {
                    return Err(MinneError::Embedding("stubbed failure".to_string()));
                }
                Ok(vec![text.len() as f32, 1.0])
            }

            fn dimensions(&self) -> usize {
                2
            }
        }

        let mut transcripts = HashMap::new();
        transcripts.insert("aaaaaaaaaaa".to_string(), words(600));
        transcripts.insert("bbbbbbbbbbb".to_string(), words(10));

        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        let pipeline = IngestPipeline::with_components(
            &settings,
            Arc::new(StubSource { transcripts }),
            Arc::new(FailSecondCall {
                calls: AtomicUsize::new(0),
            }),
            store.clone(),
        );

        let report = pipeline.run().await.unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].title, "Flaky");
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.succeeded[0].title, "Solid");

        // Only the successful document's chunks are queryable.
        let ids = store.list_ids().await.unwrap();
        assert_eq!(ids, vec!["bbbbbbbbbbb_chunk_0"]);
    }

    #[tokio::test]
    async fn test_zero_chunk_window_fails_document_not_process() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = test_settings(dir.path());
        settings.chunking.max_words = 0;
        write_manifest(&settings, &[("Misconfigured", "aaaaaaaaaaa")]);

        let mut transcripts = HashMap::new();
        transcripts.insert("aaaaaaaaaaa".to_string(), words(10));

        let (pipeline, store) = pipeline_with(&settings, transcripts, StubEmbedder::new());
        let report = pipeline.run().await.unwrap();

        assert_eq!(report.succeeded.len(), 0);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].reason.contains("max_words"));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_link_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let settings = test_settings(dir.path());

        let mut file = std::fs::File::create(settings.manifest_path()).unwrap();
        writeln!(file, "name,link").unwrap();
        writeln!(file, "Bad Row,not-a-link").unwrap();
        writeln!(file, "Good Row,https://youtu.be/bbbbbbbbbbb").unwrap();
        drop(file);

        let mut transcripts = HashMap::new();
        transcripts.insert("bbbbbbbbbbb".to_string(), words(10));

        let (pipeline, _store) = pipeline_with(&settings, transcripts, StubEmbedder::new());
        let report = pipeline.run().await.unwrap();

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].reason.contains("invalid source link"));
        assert_eq!(report.succeeded.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_manifest_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let settings = test_settings(dir.path());

        let (pipeline, _store) = pipeline_with(&settings, HashMap::new(), StubEmbedder::new());
        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, MinneError::Config(_)));
    }
}
