//! Multi-turn chat with the model server.
//!
//! Independent of the retrieval pipeline: the conversation is seeded with a
//! system prompt, replies stream token by token, and `reset` starts over.

use crate::config::{ChatSettings, Prompts, ServerSettings};
use crate::error::{DocsageError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use futures::StreamExt;
use tracing::{debug, instrument};

/// Who said a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// An interactive chat session.
pub struct ChatSession {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    system_prompt: String,
    history: Vec<ChatTurn>,
    max_history: usize,
}

impl ChatSession {
    /// Create a session from settings.
    pub fn new(server: &ServerSettings, settings: &ChatSettings, prompts: &Prompts) -> Result<Self> {
        Ok(Self {
            client: create_client(server)?,
            model: settings.model.clone(),
            system_prompt: prompts.chat.system.clone(),
            history: Vec::new(),
            max_history: settings.max_history.max(2),
        })
    }

    /// Use a different model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Conversation so far, excluding the system prompt.
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Forget the conversation. The system prompt is kept.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Send a message and stream the reply through `on_delta`.
    ///
    /// Returns the full reply. On failure the user message is dropped from
    /// history so the conversation stays consistent.
    #[instrument(skip(self, on_delta), fields(model = %self.model))]
    pub async fn send<F>(&mut self, input: &str, mut on_delta: F) -> Result<String>
    where
        F: FnMut(&str) + Send,
    {
        self.history.push(ChatTurn {
            role: Role::User,
            content: input.to_string(),
        });

        match self.stream_reply(&mut on_delta).await {
            Ok(reply) => {
                self.history.push(ChatTurn {
                    role: Role::Assistant,
                    content: reply.clone(),
                });
                self.trim_history();
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    async fn stream_reply<F>(&self, on_delta: &mut F) -> Result<String>
    where
        F: FnMut(&str) + Send,
    {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(self.request_messages()?)
            .stream(true)
            .build()
            .map_err(|e| DocsageError::Chat(e.to_string()))?;

        let mut stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| DocsageError::OpenAI(format!("Chat API error: {}", e)))?;

        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| DocsageError::OpenAI(format!("Chat stream error: {}", e)))?;
            for choice in chunk.choices {
                if let Some(content) = choice.delta.content {
                    on_delta(&content);
                    reply.push_str(&content);
                }
            }
        }

        debug!("Received {} characters", reply.len());
        Ok(reply)
    }

    /// System prompt followed by the conversation.
    fn request_messages(&self) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(self.history.len() + 1);

        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| DocsageError::Chat(e.to_string()))?
                .into(),
        );

        for turn in &self.history {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| DocsageError::Chat(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| DocsageError::Chat(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        Ok(messages)
    }

    /// Keep the most recent turns, always starting on a user message.
    fn trim_history(&mut self) {
        if self.history.len() > self.max_history {
            let excess = self.history.len() - self.max_history;
            self.history.drain(..excess);
        }
        while self
            .history
            .first()
            .is_some_and(|turn| turn.role == Role::Assistant)
        {
            self.history.remove(0);
        }
    }
}
