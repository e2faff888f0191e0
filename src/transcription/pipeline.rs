//! Two-stage transcription: speech-to-text, then sentence segmentation.

use super::TranscriptionStage;
use crate::audio_source::{AudioResolver, AudioSource, DiskBlobService};
use crate::config::{Prompts, TranscriptionSettings};
use crate::error::{LingopairError, Result};
use crate::gateway::{ChatMessage, ChatOptions, LlmGateway, OutputFormat, TranscribeOptions};
use crate::parser::{parse_segments, Segmentation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result envelope returned to callers of [`TranscriptionService::transcribe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscriptionOutcome {
    pub fn transcribed(segments: Vec<String>) -> Self {
        Self {
            success: true,
            transcript: Some(segments),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            transcript: None,
            error: Some(message.into()),
        }
    }

    /// Envelope for a source that could not be resolved.
    pub fn invalid_source(err: &LingopairError) -> Self {
        Self::failed(format!("invalid audio source: {}", err))
    }
}

/// Transcribes audio into a list of sentences.
pub struct TranscriptionService {
    gateway: Arc<dyn LlmGateway>,
    resolver: AudioResolver,
    prompts: Prompts,
    settings: TranscriptionSettings,
}

impl TranscriptionService {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        resolver: AudioResolver,
        prompts: Prompts,
        settings: TranscriptionSettings,
    ) -> Self {
        Self {
            gateway,
            resolver,
            prompts,
            settings,
        }
    }

    /// Transcribe `source`. Never fails: errors are reported through the envelope.
    ///
    /// Any temporary file created for the source is removed before returning.
    #[instrument(skip_all, fields(kind = source.kind()))]
    pub async fn transcribe(&self, source: &AudioSource) -> TranscriptionOutcome {
        debug!(stage = %TranscriptionStage::ResolvingSource);
        let resolved = match self.resolver.resolve(source).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Could not resolve audio source: {}", e);
                return TranscriptionOutcome::invalid_source(&e);
            }
        };

        let result = self.transcribe_path(resolved.path()).await;

        if let Err(e) = resolved.cleanup() {
            warn!("Failed to remove temporary audio file: {}", e);
        }
        debug!(stage = %TranscriptionStage::Done);

        match result {
            Ok(segments) => TranscriptionOutcome::transcribed(segments),
            Err(e) => {
                warn!("Transcription failed: {}", e);
                TranscriptionOutcome::failed(e.to_string())
            }
        }
    }

    /// Transcribe a source given as a loosely-typed JSON descriptor.
    pub async fn transcribe_descriptor(
        &self,
        descriptor: &Value,
        blobs: &DiskBlobService,
    ) -> TranscriptionOutcome {
        match AudioSource::from_json(descriptor, blobs) {
            Ok(source) => self.transcribe(&source).await,
            Err(e) => {
                warn!("Rejected audio source descriptor: {}", e);
                TranscriptionOutcome::invalid_source(&e)
            }
        }
    }

    async fn transcribe_path(&self, audio_path: &Path) -> Result<Vec<String>> {
        debug!(stage = %TranscriptionStage::Transcribing);
        let options = TranscribeOptions {
            model: self.settings.model.clone(),
            prompt_hint: Some(self.prompts.transcription.transcribe_hint.clone()),
        };

        let raw = self
            .gateway
            .transcribe(audio_path, &options)
            .await
            .map_err(|e| match e {
                LingopairError::TranscriptionUpstream(_) => e,
                other => LingopairError::TranscriptionUpstream(other.to_string()),
            })?;
        debug!("Raw transcript: {}", raw);

        let transcript = raw.trim();
        if transcript.is_empty() {
            info!(stage = %TranscriptionStage::EmptyResult, "Empty transcript, skipping segmentation");
            return Ok(Vec::new());
        }

        debug!(stage = %TranscriptionStage::Segmenting);
        let segmentation = self.segment(transcript).await?;
        if let Segmentation::Fallback { reason, .. } = &segmentation {
            warn!("Segmentation reply unusable ({}), keeping transcript as one segment", reason);
        }

        let segments = segmentation.into_segments();
        info!("Transcribed {} segments", segments.len());
        Ok(segments)
    }

    async fn segment(&self, transcript: &str) -> Result<Segmentation> {
        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), transcript.to_string());
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.transcription.segment, &vars);

        let options = ChatOptions {
            model: self.settings.segmentation_model.clone(),
            temperature: self.settings.segmentation_temperature,
            output_format: OutputFormat::Text,
        };

        let reply = self
            .gateway
            .chat(&[ChatMessage::user(prompt)], &options)
            .await?;

        Ok(parse_segments(&reply, transcript))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_source::StaticBlob;
    use crate::gateway::scripted::ScriptedGateway;
    use serde_json::json;
    use std::path::PathBuf;

    fn service(gateway: Arc<ScriptedGateway>, temp_dir: &Path) -> TranscriptionService {
        TranscriptionService::new(
            gateway,
            AudioResolver::new(temp_dir),
            Prompts::default(),
            TranscriptionSettings::default(),
        )
    }

    fn blob_source() -> AudioSource {
        AudioSource::Blob(Arc::new(StaticBlob {
            filename: "memo.m4a".to_string(),
            data: vec![0u8; 16],
        }))
    }

    #[tokio::test]
    async fn test_blank_transcript_skips_segmentation() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(ScriptedGateway::new().with_transcript("  \n\t "));
        let service = service(gateway.clone(), dir.path());

        let outcome = service
            .transcribe(&AudioSource::Path(PathBuf::from("/audio/silence.wav")))
            .await;

        assert_eq!(outcome, TranscriptionOutcome::transcribed(Vec::new()));
        assert!(gateway.chat_calls().is_empty());
    }

    #[tokio::test]
    async fn test_fenced_segmentation_reply() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_transcript(" a. b. ")
                .with_chat_reply("```json\n[\"a.\",\"b.\"]\n```"),
        );
        let service = service(gateway.clone(), dir.path());

        let outcome = service
            .transcribe(&AudioSource::Path(PathBuf::from("/audio/ab.wav")))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.transcript.unwrap(), vec!["a.", "b."]);

        let calls = gateway.chat_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0[0].content.contains("a. b."));
        assert_eq!(calls[0].1.output_format, OutputFormat::Text);

        let transcribe = &gateway.transcribe_calls()[0];
        assert_eq!(transcribe.options.model, "gpt-4o-transcribe");
        assert!(transcribe
            .options
            .prompt_hint
            .as_deref()
            .unwrap()
            .contains("word-for-word"));
    }

    #[tokio::test]
    async fn test_transcript_with_braces_is_sent_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_transcript("He typed {{transcript}} twice.")
                .with_chat_reply(r#"["He typed {{transcript}} twice."]"#),
        );
        let service = service(gateway.clone(), dir.path());

        service
            .transcribe(&AudioSource::Path(PathBuf::from("/audio/braces.wav")))
            .await;

        let prompt = &gateway.chat_calls()[0].0[0].content;
        assert_eq!(prompt.matches("He typed {{transcript}} twice.").count(), 1);
    }

    #[tokio::test]
    async fn test_prose_reply_falls_back_to_raw_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_transcript("こんにちは。Nice to meet you.")
                .with_chat_reply("Here are your sentences: one, two."),
        );
        let service = service(gateway, dir.path());

        let outcome = service
            .transcribe(&AudioSource::Path(PathBuf::from("/audio/hi.wav")))
            .await;

        assert!(outcome.success);
        assert_eq!(
            outcome.transcript.unwrap(),
            vec!["こんにちは。Nice to meet you.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_blob_tempfile_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_transcript("Hello.")
                .with_chat_reply("[\"Hello.\"]"),
        );
        let service = service(gateway.clone(), dir.path());

        let outcome = service.transcribe(&blob_source()).await;
        assert!(outcome.success);

        let calls = gateway.transcribe_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].existed);
        assert_eq!(calls[0].path.extension().unwrap(), "m4a");
        assert!(!calls[0].path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_blob_tempfile_removed_after_upstream_failure() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(ScriptedGateway::new().with_transcribe_error("503 from provider"));
        let service = service(gateway.clone(), dir.path());

        let outcome = service.transcribe(&blob_source()).await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().starts_with("Transcription failed"));
        assert!(!gateway.transcribe_calls()[0].path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_segmentation_gateway_failure_is_enveloped() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_transcript("Hello.")
                .with_chat_error("timeout"),
        );
        let service = service(gateway, dir.path());

        let outcome = service.transcribe(&blob_source()).await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("timeout"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_descriptor_makes_no_llm_call() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(ScriptedGateway::new());
        let service = service(gateway.clone(), dir.path());

        let outcome = service
            .transcribe_descriptor(&json!(42), &DiskBlobService::new(dir.path()))
            .await;

        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("invalid audio source: Unsupported audio source type: integer")
        );
        assert!(gateway.transcribe_calls().is_empty());
        assert!(gateway.chat_calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_blob_fails_before_llm_call() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(ScriptedGateway::new());
        let service = service(gateway.clone(), dir.path());
        let blobs = DiskBlobService::new(dir.path().join("blobs"));

        let outcome = service
            .transcribe_descriptor(&json!({"blob_key": "gone", "filename": "x.mp3"}), &blobs)
            .await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().starts_with("invalid audio source"));
        assert!(gateway.transcribe_calls().is_empty());
    }
}
