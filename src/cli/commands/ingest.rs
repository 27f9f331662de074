//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::ingest::IngestPipeline;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(manifest: Option<String>, mut settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ingest) {
        Output::error(&format!("{}", e));
        Output::info("Run 'minne doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(path) = manifest {
        settings.ingest.manifest_path = path;
    }

    Output::info(&format!(
        "Ingesting manifest: {}",
        settings.manifest_path().display()
    ));

    let pipeline = IngestPipeline::new(&settings)?;
    let report = pipeline.run().await?;

    // Final report
    Output::header("Ingestion Report");
    Output::kv(
        "Succeeded",
        &format!("{}/{}", report.succeeded.len(), report.attempted()),
    );
    Output::kv(
        "Failed",
        &format!("{}/{}", report.failed.len(), report.attempted()),
    );
    if report.skipped > 0 {
        Output::kv("Skipped (already ingested)", &report.skipped.to_string());
    }
    Output::kv("Chunks stored", &report.total_chunks().to_string());

    if !report.failed.is_empty() {
        Output::header("Failed documents");
        for (idx, failed) in report.failed.iter().enumerate() {
            Output::list_item(&format!("{}. {} ({})", idx + 1, failed.title, failed.reason));
        }
        Output::warning("Some documents failed, but the update is complete for available ones.");
    } else {
        Output::success("Knowledge base update complete.");
    }

    Ok(())
}
