//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::rag::Answerer;
use crate::speech::{OpenAISpeech, SpeechSynthesizer};
use crate::vector_store::SqliteVectorStore;
use anyhow::Result;
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    top_k: Option<usize>,
    model: Option<String>,
    speak: bool,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'minne doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let model = model.unwrap_or_else(|| settings.generation.model.clone());
    let k = top_k.unwrap_or(settings.generation.top_k);

    let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);
    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
        settings.request_timeout(),
    ));

    let answerer = Answerer::new(
        store,
        embedder,
        &model,
        settings.prompts.clone(),
        settings.request_timeout(),
    );

    let spinner = Output::spinner("Searching knowledge base...");
    let answer = match answerer.answer(question, k).await {
        Ok(answer) => {
            spinner.finish_and_clear();
            answer
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    };

    println!("\n{}\n", answer.text);

    if !answer.context.is_empty() {
        Output::info(&format!("Grounded on {} context chunks", answer.context.len()));
    }

    // Speech is best-effort: the text answer has already been delivered, so
    // a synthesis failure is only a warning.
    if speak {
        match OpenAISpeech::new(
            &settings.speech.model,
            &settings.speech.voice,
            settings.speech.speed,
            settings.request_timeout(),
        ) {
            Ok(synthesizer) => {
                let spinner = Output::spinner("Synthesizing audio...");
                match synthesizer
                    .synthesize(&answer.text, &settings.speech_output_path())
                    .await
                {
                    Ok(path) => {
                        spinner.finish_and_clear();
                        Output::success(&format!("Audio answer saved to {}", path.display()));
                    }
                    Err(e) => {
                        spinner.finish_and_clear();
                        Output::warning(&format!("Speech synthesis failed: {}", e));
                    }
                }
            }
            Err(e) => {
                Output::warning(&format!("Speech synthesis unavailable: {}", e));
            }
        }
    }

    Ok(())
}
