//! Pre-flight checks before expensive operations.
//!
//! Credentials are a startup precondition: they are validated once here,
//! before any work begins, never per provider call.

use crate::error::{MinneError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingestion requires the embedding provider's API key.
    Ingest,
    /// Asking requires embedding and generation access.
    Ask,
    /// Inspecting only reads the local store.
    Inspect,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or a fatal configuration error
/// describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Ingest | Operation::Ask => {
            check_api_key()?;
        }
        Operation::Inspect => {
            // Local-only, no credentials needed.
        }
    }
    Ok(())
}

/// Check if the OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(MinneError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(MinneError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
