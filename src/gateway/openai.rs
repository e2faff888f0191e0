//! OpenAI-backed gateway implementation.

use super::{ChatMessage, ChatOptions, ChatRole, LlmGateway, OutputFormat, TranscribeOptions};
use crate::error::{LingopairError, Result};
use crate::openai::create_client;
use async_openai::types::{
    AudioInput, AudioResponseFormat, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    CreateTranscriptionRequestArgs, ResponseFormat,
};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument};

/// Gateway that forwards chat and transcription calls to the OpenAI API.
pub struct OpenAiGateway {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
}

impl OpenAiGateway {
    /// Create a gateway with the default client configuration.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: create_client()?,
        })
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let built: ChatCompletionRequestMessage = match message.role {
            ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| LingopairError::Gateway(e.to_string()))?
                .into(),
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| LingopairError::Gateway(e.to_string()))?
                .into(),
            ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| LingopairError::Gateway(e.to_string()))?
                .into(),
        };
        Ok(built)
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    #[instrument(skip(self, messages), fields(model = %options.model, messages = messages.len()))]
    async fn chat(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<String> {
        let request_messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&options.model)
            .messages(request_messages)
            .temperature(options.temperature);

        if options.output_format == OutputFormat::JsonObject {
            builder.response_format(ResponseFormat::JsonObject);
        }

        let request = builder
            .build()
            .map_err(|e| LingopairError::Gateway(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LingopairError::Gateway(format!("{} API error: {}", options.model, e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| LingopairError::Gateway("Empty response from LLM".to_string()))?
            .clone();

        debug!("Chat response: {} chars", content.len());
        Ok(content)
    }

    #[instrument(skip(self), fields(audio_path = %audio_path.display(), model = %options.model))]
    async fn transcribe(&self, audio_path: &Path, options: &TranscribeOptions) -> Result<String> {
        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&options.model)
            .response_format(AudioResponseFormat::Json);

        if let Some(hint) = &options.prompt_hint {
            request_builder.prompt(hint);
        }

        let request = request_builder.build().map_err(|e| {
            LingopairError::TranscriptionUpstream(format!("Failed to build request: {}", e))
        })?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| {
                LingopairError::TranscriptionUpstream(format!("{} API error: {}", options.model, e))
            })?;

        Ok(response.text)
    }
}
