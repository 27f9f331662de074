//! Vector store abstraction for Minne.
//!
//! Provides a trait-based interface over the on-disk chunk index. A single
//! logical collection holds every embedded chunk; records are keyed by the
//! chunk's derived id and replaced wholesale on re-ingestion.

mod sqlite;

pub use sqlite::SqliteVectorStore;

use crate::chunking::TextChunk;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fixed metadata attached to every stored chunk.
///
/// Deliberately a closed record rather than an open map so the store's
/// schema stays checkable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Title of the source document.
    pub title: String,
    /// Short description of the chunk.
    pub summary: String,
    /// Content category.
    pub category: String,
}

impl Default for ChunkMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            summary: "Auto-generated".to_string(),
            category: "Auto-generated".to_string(),
        }
    }
}

impl ChunkMetadata {
    /// Metadata for an auto-chunked segment of a titled document.
    pub fn auto(title: &str, ordinal: usize) -> Self {
        Self {
            title: title.to_string(),
            summary: format!("Auto-generated chunk {}", ordinal + 1),
            category: "Auto-generated".to_string(),
        }
    }
}

/// A chunk record as persisted in the vector store.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// Stable identifier: `{document_id}_chunk_{ordinal}`.
    pub id: String,
    /// Identifier of the source document.
    pub document_id: String,
    /// Zero-based position of the chunk within its document.
    pub chunk_index: usize,
    /// Text content.
    pub content: String,
    /// Attached metadata.
    pub metadata: ChunkMetadata,
    /// Embedding vector.
    pub embedding: Vec<f32>,
}

impl ChunkRecord {
    /// Build a record from a chunk, its document, and its embedding.
    pub fn from_chunk(
        document_id: &str,
        title: &str,
        chunk: &TextChunk,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: chunk.store_id(document_id),
            document_id: document_id.to_string(),
            chunk_index: chunk.ordinal,
            content: chunk.content.clone(),
            metadata: ChunkMetadata::auto(title, chunk.ordinal),
            embedding,
        }
    }
}

/// A nearest-neighbor query hit.
#[derive(Debug, Clone)]
pub struct QueryHit {
    /// Text content of the matched chunk.
    pub content: String,
    /// Metadata of the matched chunk.
    pub metadata: ChunkMetadata,
    /// Cosine distance to the query vector (smaller is closer).
    pub distance: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace the record at its chunk id. Idempotent under
    /// identical input.
    async fn upsert(&self, record: &ChunkRecord) -> Result<()>;

    /// Return the `k` records nearest to the query vector, closest first,
    /// ties broken by insertion order. `k` must be positive; a `k` larger
    /// than the collection returns everything. An empty collection yields an
    /// empty result, not an error.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<QueryHit>>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize>;

    /// All stored chunk ids.
    async fn list_ids(&self) -> Result<Vec<String>>;

    /// Fetch a single record by chunk id.
    async fn get(&self, id: &str) -> Result<Option<ChunkRecord>>;

    /// Delete every chunk belonging to a document. Returns the number of
    /// deleted records.
    async fn delete_by_document_id(&self, document_id: &str) -> Result<usize>;
}

/// Compute cosine distance between two vectors (0 = identical direction).
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_distance_ordering() {
        let query = vec![1.0, 0.0];
        let near = vec![0.9, 0.1];
        let far = vec![0.1, 0.9];
        assert!(cosine_distance(&query, &near) < cosine_distance(&query, &far));
    }

    #[test]
    fn test_auto_metadata_is_one_based() {
        let meta = ChunkMetadata::auto("Sleep Toolkit", 0);
        assert_eq!(meta.title, "Sleep Toolkit");
        assert_eq!(meta.summary, "Auto-generated chunk 1");
        assert_eq!(meta.category, "Auto-generated");
    }
}
