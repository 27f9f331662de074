//! Shared OpenAI client construction.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client whose requests time out after `timeout`.
///
/// The timeout comes from `general.request_timeout_secs` in the settings;
/// it bounds a hung connection, not a slow generation, so chat completions
/// over large context blocks still get minutes to finish.
pub fn create_client(timeout: Duration) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}
