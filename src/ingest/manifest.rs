//! Input manifest parsing.
//!
//! The manifest is a CSV with `name,link` columns, one row per source
//! document. It is produced by an external channel-scraping step, consumed
//! once per run, and removed when the run fully completes.

use crate::error::{MinneError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

/// One row of the input manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    /// Human-readable document title.
    pub name: String,
    /// Source URL the document id is derived from.
    pub link: String,
}

/// Read all manifest rows.
///
/// A missing manifest is a fatal configuration error: there is nothing to
/// ingest and the caller should not start a run at all.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    if !path.exists() {
        return Err(MinneError::Config(format!(
            "No manifest found at {}. Add your links CSV and try again.",
            path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut entries = Vec::new();
    for row in reader.deserialize() {
        let entry: ManifestEntry = row?;
        entries.push(entry);
    }
    Ok(entries)
}

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Matches watch URLs, short youtu.be links, and embed URLs.
        Regex::new(r"(?:v=|be/|embed/)([A-Za-z0-9_-]{11})").expect("Invalid video id regex")
    })
}

/// Derive the stable document id from a source link.
///
/// Returns `None` when the link carries no recognizable id; the pipeline
/// reports such rows as failed documents rather than aborting the run.
pub fn extract_document_id(link: &str) -> Option<String> {
    video_id_regex()
        .captures(link.trim())
        .map(|caps| caps[1].to_string())
}

/// Sanitize a document title for use in an archive filename.
///
/// Lowercases, collapses whitespace to underscores, strips anything that is
/// not a word character or hyphen, and truncates to 50 characters.
pub fn sanitize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let underscored = lowered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let cleaned: String = underscored
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    cleaned.chars().take(50).collect()
}
