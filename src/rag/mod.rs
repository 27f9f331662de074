//! Retrieval-augmented answering.
//!
//! Embeds the question, retrieves the top-k nearest chunks, assembles a
//! grounded prompt from the persona templates, and delegates to the chat
//! completion provider.

pub mod context;

pub use context::{format_context, ContextBuilder};

use crate::config::Prompts;
use crate::embedding::Embedder;
use crate::error::{MinneError, Result};
use crate::openai::create_client;
use crate::vector_store::{QueryHit, VectorStore};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// A generated answer together with the context it was grounded on.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The provider's output text, verbatim.
    pub text: String,
    /// The retrieved chunks that formed the context block.
    pub context: Vec<QueryHit>,
}

/// Retrieval-augmented answerer.
pub struct Answerer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    prompts: Prompts,
    context_builder: ContextBuilder,
}

impl Answerer {
    /// Create a new answerer over a store and embedder.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        model: &str,
        prompts: Prompts,
        timeout: Duration,
    ) -> Self {
        Self {
            client: create_client(timeout),
            model: model.to_string(),
            prompts,
            context_builder: ContextBuilder::new(store, embedder),
        }
    }

    /// Answer a question using the top-`k` most similar stored chunks.
    ///
    /// Thin or empty context is not an error; the prompt instructs the
    /// model to fall back to a fixed sentence when the context does not
    /// support an answer.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn answer(&self, question: &str, k: usize) -> Result<Answer> {
        info!("Answering question with k={}", k);

        let hits = self.context_builder.retrieve(question, k).await?;
        let context_block = format_context(&hits);

        let user_prompt = assemble_user_prompt(&self.prompts, &context_block, question);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.persona.system.clone())
                .build()
                .map_err(|e| MinneError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| MinneError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| MinneError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| MinneError::OpenAI(format!("Failed to generate answer: {}", e)))?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| MinneError::Generation("Empty response from model".to_string()))?
            .clone();

        Ok(Answer { text, context: hits })
    }
}

/// Render the user turn: context block, question, and the grounding
/// instruction with its fallback sentence.
pub fn assemble_user_prompt(prompts: &Prompts, context_block: &str, question: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("context", context_block.to_string());
    vars.insert("question", question.to_string());
    vars.insert("fallback", prompts.persona.fallback.clone());

    Prompts::render(&prompts.persona.user, &vars)
}
