//! Chat-completion backed generator.

use super::{truncate_context, Generator};
use crate::config::{GenerationSettings, Prompts, ServerSettings};
use crate::error::{DocsageError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Generates answers through the model server's chat completion endpoint.
pub struct ChatGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_context_chars: usize,
    prompts: Prompts,
}

impl ChatGenerator {
    /// Create a generator from settings.
    pub fn new(server: &ServerSettings, settings: &GenerationSettings) -> Result<Self> {
        Ok(Self::with_client(create_client(server)?, settings))
    }

    /// Create a generator with a custom client.
    pub fn with_client(
        client: async_openai::Client<async_openai::config::OpenAIConfig>,
        settings: &GenerationSettings,
    ) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_context_chars: settings.max_context_chars,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// The model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Render the user prompt for a question and its context.
    pub fn render_prompt(&self, query: &str, context: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), query.to_string());
        vars.insert(
            "context".to_string(),
            truncate_context(context, self.max_context_chars).to_string(),
        );
        self.prompts.render_with_custom(&self.prompts.rag.user, &vars)
    }

    fn build_messages(&self, user_prompt: String) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages = Vec::with_capacity(2);
        if !self.prompts.rag.system.trim().is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.prompts.rag.system.clone())
                    .build()
                    .map_err(|e| DocsageError::GenerationFailure(e.to_string()))?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| DocsageError::GenerationFailure(e.to_string()))?
                .into(),
        );
        Ok(messages)
    }
}

#[async_trait]
impl Generator for ChatGenerator {
    #[instrument(skip(self, context), fields(model = %self.model, context_len = context.len()))]
    #[allow(deprecated)]
    async fn generate(&self, query: &str, context: &str, max_tokens: u32) -> Result<String> {
        info!("Generating answer");

        let messages = self.build_messages(self.render_prompt(query, context))?;

        // Ollama honours `max_tokens`, not `max_completion_tokens`.
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| DocsageError::GenerationFailure(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| DocsageError::GenerationFailure(format!("Completion request failed: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| DocsageError::GenerationFailure("Empty response from model".to_string()))?;

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(max_context_chars: usize) -> ChatGenerator {
        let settings = GenerationSettings {
            max_context_chars,
            ..GenerationSettings::default()
        };
        ChatGenerator::new(&ServerSettings::default(), &settings).unwrap()
    }

    #[test]
    fn test_render_prompt_uses_template() {
        let prompt = generator(1000).render_prompt("What changed?", "Javax became Jakarta.");
        assert_eq!(
            prompt,
            "Context: Javax became Jakarta.\nQuestion: What changed?\nAnswer:"
        );
    }

    #[test]
    fn test_render_prompt_truncates_context() {
        let prompt = generator(5).render_prompt("Q", "0123456789");
        assert_eq!(prompt, "Context: 01234\nQuestion: Q\nAnswer:");
    }

    #[test]
    fn test_system_message_only_when_configured() {
        let plain = generator(100);
        assert_eq!(plain.build_messages("hi".to_string()).unwrap().len(), 1);

        let mut prompts = Prompts::default();
        prompts.rag.system = "Answer briefly.".to_string();
        let with_system = generator(100).with_prompts(prompts);
        assert_eq!(with_system.build_messages("hi".to_string()).unwrap().len(), 2);
    }
}
