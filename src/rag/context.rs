//! Context retrieval for RAG answers.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{QueryHit, VectorStore};
use std::sync::Arc;
use tracing::debug;

/// Retrieves the chunks most relevant to a question.
pub struct ContextBuilder {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
}

impl ContextBuilder {
    /// Create a new context builder over a store and embedder.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Embed the question and fetch its top-k nearest chunks.
    ///
    /// An empty store (or fewer than `k` records) simply yields fewer hits;
    /// the grounding instruction in the prompt handles thin context.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<QueryHit>> {
        let query_embedding = self.embedder.embed(question).await?;
        let hits = self.store.query(&query_embedding, k).await?;
        debug!("Retrieved {} context chunks", hits.len());
        Ok(hits)
    }
}

/// Join retrieved chunk texts into the context block, separated by blank
/// lines, preserving the store's ranking order.
pub fn format_context(hits: &[QueryHit]) -> String {
    hits.iter()
        .map(|hit| hit.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::vector_store::{ChunkMetadata, ChunkRecord, SqliteVectorStore};
    use async_trait::async_trait;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn record(id: &str, doc: &str, content: &str) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            document_id: doc.to_string(),
            chunk_index: 0,
            content: content.to_string(),
            metadata: ChunkMetadata::auto(doc, 0),
            embedding: vec![1.0, 0.0],
        }
    }

    #[tokio::test]
    async fn test_retrieval_only_draws_from_stored_documents() {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        store
            .upsert(&record("a_chunk_0", "a", "alpha text"))
            .await
            .unwrap();
        store
            .upsert(&record("a_chunk_1", "a", "more alpha"))
            .await
            .unwrap();

        let builder = ContextBuilder::new(store, Arc::new(FixedEmbedder));
        let hits = builder.retrieve("anything", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert_eq!(hit.metadata.title, "a");
        }
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_context() {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        let builder = ContextBuilder::new(store, Arc::new(FixedEmbedder));

        let hits = builder.retrieve("anything", 3).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(format_context(&hits), "");
    }

    fn hit(content: &str) -> QueryHit {
        QueryHit {
            content: content.to_string(),
            metadata: ChunkMetadata::default(),
            distance: 0.0,
        }
    }

    #[test]
    fn test_format_context_joins_with_blank_lines() {
        let hits = vec![hit("first chunk"), hit("second chunk")];
        assert_eq!(format_context(&hits), "first chunk\n\nsecond chunk");
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), "");
    }
}
