//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine distance computed in Rust for simplicity. For
//! large collections, consider the sqlite-vec extension or a dedicated
//! vector database.

use super::{cosine_distance, ChunkMetadata, ChunkRecord, QueryHit, VectorStore};
use crate::error::{MinneError, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        document_id TEXT NOT NULL,
        chunk_index INTEGER NOT NULL,
        content TEXT NOT NULL,
        title TEXT NOT NULL,
        summary TEXT NOT NULL,
        category TEXT NOT NULL,
        embedding BLOB NOT NULL,
        inserted_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_document_id ON chunks(document_id);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a vector store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| MinneError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChunkRecord> {
        let chunk_index: i64 = row.get(2)?;
        let embedding_bytes: Vec<u8> = row.get(7)?;

        Ok(ChunkRecord {
            id: row.get(0)?,
            document_id: row.get(1)?,
            chunk_index: chunk_index as usize,
            content: row.get(3)?,
            metadata: ChunkMetadata {
                title: row.get(4)?,
                summary: row.get(5)?,
                category: row.get(6)?,
            },
            embedding: Self::bytes_to_embedding(&embedding_bytes),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn upsert(&self, record: &ChunkRecord) -> Result<()> {
        let conn = self.lock()?;

        let embedding_bytes = Self::embedding_to_bytes(&record.embedding);

        // ON CONFLICT DO UPDATE keeps the original rowid, so insertion-order
        // tie-breaks stay stable when a chunk is re-ingested.
        conn.execute(
            r#"
            INSERT INTO chunks
            (id, document_id, chunk_index, content, title, summary, category, embedding, inserted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                document_id = excluded.document_id,
                chunk_index = excluded.chunk_index,
                content = excluded.content,
                title = excluded.title,
                summary = excluded.summary,
                category = excluded.category,
                embedding = excluded.embedding
            "#,
            params![
                record.id,
                record.document_id,
                record.chunk_index as i64,
                record.content,
                record.metadata.title,
                record.metadata.summary,
                record.metadata.category,
                embedding_bytes,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;

        debug!("Upserted chunk {}", record.id);
        Ok(())
    }

    #[instrument(skip(self, embedding))]
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        if k == 0 {
            return Err(MinneError::InvalidInput(
                "query k must be a positive integer".to_string(),
            ));
        }

        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, document_id, chunk_index, content, title, summary, category, embedding
            FROM chunks
            ORDER BY rowid
            "#,
        )?;

        let records = stmt.query_map([], Self::row_to_record)?;

        let mut hits: Vec<QueryHit> = records
            .filter_map(|r| r.ok())
            .map(|record| QueryHit {
                distance: cosine_distance(embedding, &record.embedding),
                content: record.content,
                metadata: record.metadata,
            })
            .collect();

        // Stable sort preserves insertion order among equal distances.
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        debug!("Query returned {} hits", hits.len());
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id FROM chunks ORDER BY rowid")?;
        let ids = stmt.query_map([], |row| row.get(0))?;
        Ok(ids.filter_map(|r| r.ok()).collect())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<ChunkRecord>> {
        let conn = self.lock()?;

        let record = conn.query_row(
            r#"
            SELECT id, document_id, chunk_index, content, title, summary, category, embedding
            FROM chunks
            WHERE id = ?1
            "#,
            params![id],
            Self::row_to_record,
        );

        match record {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn delete_by_document_id(&self, document_id: &str) -> Result<usize> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM chunks WHERE document_id = ?1",
            params![document_id],
        )?;

        if deleted > 0 {
            info!("Deleted {} chunks for document {}", deleted, document_id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, doc: &str, index: usize, content: &str, embedding: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            document_id: doc.to_string(),
            chunk_index: index,
            content: content.to_string(),
            metadata: ChunkMetadata::auto("Test Episode", index),
            embedding,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let rec = record("doc1_chunk_0", "doc1", 0, "hello world", vec![1.0, 0.0]);

        store.upsert(&rec).await.unwrap();
        store.upsert(&rec).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);

        let hits = store.query(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "hello world");
    }

    #[tokio::test]
    async fn test_query_empty_store_returns_empty() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let hits = store.query(&[1.0, 0.0], 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_query_rejects_zero_k() {
        let store = SqliteVectorStore::in_memory().unwrap();
        assert!(store.query(&[1.0, 0.0], 0).await.is_err());
    }

    #[tokio::test]
    async fn test_query_orders_by_distance_then_insertion() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .upsert(&record("a_chunk_0", "a", 0, "far", vec![0.0, 1.0]))
            .await
            .unwrap();
        store
            .upsert(&record("b_chunk_0", "b", 0, "near first", vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert(&record("c_chunk_0", "c", 0, "near second", vec![1.0, 0.0]))
            .await
            .unwrap();

        let hits = store.query(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].content, "near first");
        assert_eq!(hits[1].content, "near second");
        assert_eq!(hits[2].content, "far");
    }

    #[tokio::test]
    async fn test_k_larger_than_collection_returns_all() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .upsert(&record("a_chunk_0", "a", 0, "only", vec![1.0, 0.0]))
            .await
            .unwrap();

        let hits = store.query(&[0.5, 0.5], 100).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_document_id() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .upsert(&record("a_chunk_0", "a", 0, "one", vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert(&record("a_chunk_1", "a", 1, "two", vec![0.0, 1.0]))
            .await
            .unwrap();
        store
            .upsert(&record("b_chunk_0", "b", 0, "three", vec![0.0, 1.0]))
            .await
            .unwrap();

        let deleted = store.delete_by_document_id("a").await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.list_ids().await.unwrap(), vec!["b_chunk_0"]);
    }

    #[tokio::test]
    async fn test_get_round_trips_record() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let rec = record("a_chunk_0", "a", 0, "content", vec![0.25, -0.75]);
        store.upsert(&rec).await.unwrap();

        let loaded = store.get("a_chunk_0").await.unwrap().unwrap();
        assert_eq!(loaded.document_id, "a");
        assert_eq!(loaded.content, "content");
        assert_eq!(loaded.metadata.summary, "Auto-generated chunk 1");
        assert_eq!(loaded.embedding, vec![0.25, -0.75]);

        assert!(store.get("missing").await.unwrap().is_none());
    }
}
