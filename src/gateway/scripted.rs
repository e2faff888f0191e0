//! Scripted gateway for tests: replays canned replies and records every call.

use super::{ChatMessage, ChatOptions, LlmGateway, TranscribeOptions};
use crate::error::{LingopairError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A transcription call as seen by the gateway.
#[derive(Debug, Clone)]
pub struct TranscribeCall {
    pub path: PathBuf,
    /// Whether the audio file existed when the gateway was called.
    pub existed: bool,
    pub options: TranscribeOptions,
}

#[derive(Default)]
pub struct ScriptedGateway {
    chat_replies: Mutex<VecDeque<Result<String>>>,
    transcribe_replies: Mutex<VecDeque<Result<String>>>,
    chat_calls: Mutex<Vec<(Vec<ChatMessage>, ChatOptions)>>,
    transcribe_calls: Mutex<Vec<TranscribeCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat_reply(self, reply: &str) -> Self {
        self.chat_replies.lock().unwrap().push_back(Ok(reply.to_string()));
        self
    }

    pub fn with_chat_error(self, message: &str) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Err(LingopairError::Gateway(message.to_string())));
        self
    }

    pub fn with_transcript(self, text: &str) -> Self {
        self.transcribe_replies
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
        self
    }

    pub fn with_transcribe_error(self, message: &str) -> Self {
        self.transcribe_replies
            .lock()
            .unwrap()
            .push_back(Err(LingopairError::TranscriptionUpstream(message.to_string())));
        self
    }

    pub fn chat_calls(&self) -> Vec<(Vec<ChatMessage>, ChatOptions)> {
        self.chat_calls.lock().unwrap().clone()
    }

    pub fn transcribe_calls(&self) -> Vec<TranscribeCall> {
        self.transcribe_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn chat(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<String> {
        self.chat_calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), options.clone()));
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LingopairError::Gateway("no scripted chat reply".to_string())))
    }

    async fn transcribe(&self, audio_path: &Path, options: &TranscribeOptions) -> Result<String> {
        self.transcribe_calls.lock().unwrap().push(TranscribeCall {
            path: audio_path.to_path_buf(),
            existed: audio_path.exists(),
            options: options.clone(),
        });
        self.transcribe_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LingopairError::TranscriptionUpstream(
                    "no scripted transcript".to_string(),
                ))
            })
    }
}
