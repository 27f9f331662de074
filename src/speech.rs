//! Speech synthesis of generated answers.
//!
//! A thin pass-through to a text-to-speech provider. Synthesis is strictly
//! optional: failures are reported to the caller and never block delivery
//! of the text answer.

use crate::error::{MinneError, Result};
use crate::openai::create_client;
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, Voice};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Trait for speech synthesis providers.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize text to an audio file and return its path.
    async fn synthesize(&self, text: &str, output: &Path) -> Result<PathBuf>;
}

/// OpenAI text-to-speech synthesizer.
pub struct OpenAISpeech {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
    speed: f32,
}

impl OpenAISpeech {
    /// Create a synthesizer from model, voice, speaking rate and request
    /// timeout settings.
    pub fn new(model: &str, voice: &str, speed: f32, timeout: Duration) -> Result<Self> {
        let model = match model {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        };

        let voice = parse_voice(voice)?;

        Ok(Self {
            client: create_client(timeout),
            model,
            voice,
            speed,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeech {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn synthesize(&self, text: &str, output: &Path) -> Result<PathBuf> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.model.clone())
            .voice(self.voice.clone())
            .speed(self.speed)
            .build()
            .map_err(|e| MinneError::Speech(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| MinneError::OpenAI(format!("Speech API error: {}", e)))?;

        response
            .save(output)
            .await
            .map_err(|e| MinneError::Speech(format!("Failed to write audio file: {}", e)))?;

        info!("Wrote synthesized answer to {:?}", output);
        Ok(output.to_path_buf())
    }
}

/// Map a configured voice name onto the provider's voice set.
fn parse_voice(name: &str) -> Result<Voice> {
    match name.to_lowercase().as_str() {
        "alloy" => Ok(Voice::Alloy),
        "echo" => Ok(Voice::Echo),
        "fable" => Ok(Voice::Fable),
        "onyx" => Ok(Voice::Onyx),
        "nova" => Ok(Voice::Nova),
        "shimmer" => Ok(Voice::Shimmer),
        other => Err(MinneError::Config(format!(
            "Unknown speech voice '{}'. Expected one of: alloy, echo, fable, onyx, nova, shimmer",
            other
        ))),
    }
}
