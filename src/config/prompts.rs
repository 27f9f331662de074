//! Prompt templates for Minne.
//!
//! The persona prompt casts the assistant as the host of the ingested show;
//! the user template carries the retrieved context, the question, and the
//! grounding instruction with its fixed fallback sentence.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fallback sentence the model must use when the context does not support
/// an answer.
pub const DEFAULT_FALLBACK: &str = "Sorry, I don't have context on that.";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub persona: PersonaPrompts,
}

/// Prompts for retrieval-augmented answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaPrompts {
    /// Fixed persona/style instruction for the system turn.
    pub system: String,
    /// User turn template; `{{context}}`, `{{question}}` and `{{fallback}}`
    /// are substituted at answer time.
    pub user: String,
    /// Sentence the model answers with when the context is insufficient.
    pub fallback: String,
}

impl Default for PersonaPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are the host of the show whose transcripts make up the knowledge base. Speak in a detailed, science-backed style similar to the speaking manner in the provided context. Be clear, encouraging and conversational, and cite specific mechanisms where possible. When asked for protocols, give step-by-step, science-based steps, starting with the actions and then offering to explain the science behind any of them."#.to_string(),

            user: r#"Context:
{{context}}

Question: {{question}}

Answer conversationally, in the same manner as the speaker in the context. If you don't see the answer in the context, respond with '{{fallback}}'"#.to_string(),

            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }
}

impl Prompts {
    /// Render a template, substituting `{{name}}` placeholders.
    pub fn render(template: &str, vars: &HashMap<&str, String>) -> String {
        let mut rendered = template.to_string();
        for (name, value) in vars {
            rendered = rendered.replace(&format!("{{{{{}}}}}", name), value);
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("question", "What is sleep?".to_string());
        vars.insert("context", "Sleep is rest.".to_string());

        let rendered = Prompts::render("Q: {{question}}\nC: {{context}}", &vars);
        assert_eq!(rendered, "Q: What is sleep?\nC: Sleep is rest.");
    }

    #[test]
    fn test_default_user_prompt_carries_fallback_instruction() {
        let prompts = Prompts::default();
        assert!(prompts.persona.user.contains("{{fallback}}"));
        assert_eq!(prompts.persona.fallback, DEFAULT_FALLBACK);
    }
}
