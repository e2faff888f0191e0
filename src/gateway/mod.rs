//! LLM gateway abstraction.
//!
//! Both services talk to the language model through [`LlmGateway`], which exposes a
//! single chat capability and a single speech-to-text capability. The gateway is
//! injected at construction time so tests can substitute a scripted double.

mod openai;
#[cfg(test)]
pub(crate) mod scripted;

pub use openai::OpenAiGateway;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Output format requested from the chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    /// Constrain the model to emit a single JSON object.
    JsonObject,
}

/// Options for a chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: f32,
    pub output_format: OutputFormat,
}

/// Options for a speech-to-text call.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeOptions {
    pub model: String,
    pub prompt_hint: Option<String>,
}

/// Capability boundary over an external language model.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send an ordered conversation and return the model's text reply.
    async fn chat(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<String>;

    /// Transcribe the audio file at `audio_path` and return the raw text.
    async fn transcribe(&self, audio_path: &Path, options: &TranscribeOptions) -> Result<String>;
}
