//! YouTube caption transcript source.
//!
//! Fetches auto or manual captions from YouTube's timedtext endpoint and
//! flattens them to plain text. Videos without captions return an empty
//! body, which maps to the soft "transcript unavailable" failure.

use super::TranscriptSource;
use crate::error::{MinneError, Result};
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, instrument};

const TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";

/// Transcript source backed by YouTube's caption track endpoint.
pub struct YoutubeTranscriptSource {
    client: reqwest::Client,
    language: String,
    text_tag_regex: Regex,
}

impl YoutubeTranscriptSource {
    /// Create a source fetching captions in the given language code.
    pub fn new(language: &str) -> Self {
        let text_tag_regex =
            Regex::new(r"(?s)<text[^>]*>(.*?)</text>").expect("Invalid caption regex");

        Self {
            client: reqwest::Client::new(),
            language: language.to_string(),
            text_tag_regex,
        }
    }

    /// Flatten a timedtext XML payload into a single line of text.
    fn flatten_captions(&self, xml: &str) -> String {
        let parts: Vec<String> = self
            .text_tag_regex
            .captures_iter(xml)
            .map(|caps| decode_entities(caps[1].trim()))
            .filter(|s| !s.is_empty())
            .collect();

        parts.join(" ")
    }
}

impl Default for YoutubeTranscriptSource {
    fn default() -> Self {
        Self::new("en")
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    #[instrument(skip(self))]
    async fn fetch_transcript(&self, document_id: &str) -> Result<String> {
        let response = self
            .client
            .get(TIMEDTEXT_URL)
            .query(&[("lang", self.language.as_str()), ("v", document_id)])
            .send()
            .await
            .map_err(|e| MinneError::Fetch(format!("{}: {}", document_id, e)))?;

        if !response.status().is_success() {
            return Err(MinneError::Fetch(format!(
                "{}: HTTP {}",
                document_id,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MinneError::Fetch(format!("{}: {}", document_id, e)))?;

        // The endpoint answers 200 with an empty body when captions are
        // disabled or the video does not exist.
        if body.trim().is_empty() {
            return Err(MinneError::TranscriptUnavailable(document_id.to_string()));
        }

        let text = self.flatten_captions(&body);
        if text.is_empty() {
            return Err(MinneError::TranscriptUnavailable(document_id.to_string()));
        }

        debug!("Fetched transcript of {} characters", text.len());
        Ok(text)
    }
}

/// Decode the XML entities that appear in caption tracks.
///
/// `&amp;` goes last so that doubly escaped text like `&amp;lt;` decodes to
/// the literal `&lt;` rather than being decoded twice.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
