//! Doctor command - diagnostics for configuration and knowledge-base state.

use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::{SqliteVectorStore, VectorStore};
use anyhow::Result;

/// Run the doctor command.
pub async fn run_doctor(settings: &Settings) -> Result<()> {
    Output::header("Minne Doctor");

    // Credentials
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Output::success("OPENAI_API_KEY is set"),
        _ => Output::error("OPENAI_API_KEY is not set (required for ingest and ask)"),
    }

    // Config file
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::success(&format!("Config file: {}", config_path.display()));
    } else {
        Output::info("No config file; using defaults (run 'minne init' to create one)");
    }

    // Manifest
    let manifest = settings.manifest_path();
    if manifest.exists() {
        Output::success(&format!("Manifest present: {}", manifest.display()));
    } else {
        Output::info(&format!("No manifest at {} (nothing queued to ingest)", manifest.display()));
    }

    // Ledger
    let ledger = settings.ledger_path();
    if ledger.exists() {
        Output::info(&format!(
            "In-progress ledger found: {} (a previous run will resume)",
            ledger.display()
        ));
    }

    // Vector store
    let db_path = settings.sqlite_path();
    if db_path.exists() {
        let store = SqliteVectorStore::new(&db_path)?;
        let count = store.count().await?;
        Output::success(&format!(
            "Vector store: {} ({} chunks)",
            db_path.display(),
            count
        ));
    } else {
        Output::info("No vector store yet; run 'minne ingest' to build one");
    }

    Ok(())
}
