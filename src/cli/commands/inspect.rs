//! Inspect command implementation.
//!
//! Read-only look into the stored chunk collection: totals, ids, and an
//! optional single-chunk view by ordinal.

use crate::cli::output::content_preview;
use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::{SqliteVectorStore, VectorStore};
use anyhow::Result;

/// Run the inspect command.
pub async fn run_inspect(chunk: Option<usize>, settings: Settings) -> Result<()> {
    let db_path = settings.sqlite_path();
    if !db_path.exists() {
        Output::warning("No vector store found yet. Run 'minne ingest' first.");
        return Ok(());
    }

    let store = SqliteVectorStore::new(&db_path)?;

    let total = store.count().await?;
    let ids = store.list_ids().await?;

    Output::header("Knowledge Base");
    Output::kv("Total chunks", &total.to_string());
    Output::kv("Unique ids", &ids.len().to_string());

    let Some(ordinal) = chunk else {
        return Ok(());
    };

    // First chunk across all documents with the requested ordinal.
    let suffix = format!("_chunk_{}", ordinal);
    let Some(id) = ids.iter().find(|id| id.ends_with(&suffix)) else {
        Output::warning(&format!("No chunk found with ordinal {}", ordinal));
        return Ok(());
    };

    let Some(record) = store.get(id).await? else {
        Output::warning(&format!("Chunk {} disappeared from the store", id));
        return Ok(());
    };

    Output::header(&format!("Chunk {}", ordinal));
    Output::kv("Id", &record.id);
    Output::kv("Document", &record.document_id);
    Output::kv("Title", &record.metadata.title);
    Output::kv("Summary", &record.metadata.summary);
    Output::kv("Category", &record.metadata.category);
    Output::kv("Content", &content_preview(&record.content, 1000));

    Ok(())
}
