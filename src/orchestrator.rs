//! Wires settings, prompts, the LLM gateway and the content store into services.

use crate::audio_source::{AudioResolver, DiskBlobService};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::gateway::{LlmGateway, OpenAiGateway};
use crate::generation::TopicGenerationService;
use crate::store::{ContentStore, SqliteContentStore};
use crate::transcription::TranscriptionService;
use std::sync::Arc;
use tracing::info;

/// Shared components for the generation and transcription services.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    gateway: Arc<dyn LlmGateway>,
    store: Arc<dyn ContentStore>,
    blobs: DiskBlobService,
}

impl Orchestrator {
    /// Build the default components from `settings`: OpenAI gateway and SQLite store.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let gateway: Arc<dyn LlmGateway> = Arc::new(OpenAiGateway::new()?);

        let sqlite_path = settings.sqlite_path();
        if let Some(parent) = sqlite_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store: Arc<dyn ContentStore> = Arc::new(SqliteContentStore::new(&sqlite_path)?);
        info!("Using content store at {}", sqlite_path.display());

        Ok(Self::with_components(settings, prompts, gateway, store))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        gateway: Arc<dyn LlmGateway>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        let blobs = DiskBlobService::new(settings.blob_root());
        Self {
            settings,
            prompts,
            gateway,
            store,
            blobs,
        }
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn blobs(&self) -> &DiskBlobService {
        &self.blobs
    }

    pub fn generation_service(&self) -> TopicGenerationService {
        TopicGenerationService::new(
            self.gateway.clone(),
            self.store.clone(),
            self.prompts.clone(),
            self.settings.generation.clone(),
        )
    }

    pub fn transcription_service(&self) -> TranscriptionService {
        TranscriptionService::new(
            self.gateway.clone(),
            AudioResolver::new(self.settings.temp_dir()),
            self.prompts.clone(),
            self.settings.transcription.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_source::AudioSource;
    use crate::gateway::scripted::ScriptedGateway;
    use crate::generation::LearnerProfile;
    use serde_json::json;

    fn generation_reply() -> String {
        json!({
            "topic_content": {"en": "Weekend plans", "ja": "週末の予定"},
            "challenges": [
                {"target_level": "N4", "content": {"task": "ask"}, "conversation": []},
                {"target_level": "B1", "content": {"task": "answer"}, "conversation": []}
            ],
            "grammar_points": [
                {"title": "〜たい", "language": "ja", "level": "N5", "explanation": "want to"}
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_services_share_gateway_and_store() {
        let blob_dir = tempfile::tempdir().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(blob_dir.path().join("k1"), b"RIFF").unwrap();

        let mut settings = Settings::default();
        settings.storage.blob_root = blob_dir.path().display().to_string();
        settings.general.temp_dir = temp_dir.path().display().to_string();

        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_chat_reply(&generation_reply())
                .with_transcript("Hi. Bye.")
                .with_chat_reply(r#"["Hi.", "Bye."]"#),
        );
        let store: Arc<dyn ContentStore> = Arc::new(SqliteContentStore::in_memory().unwrap());
        let orchestrator =
            Orchestrator::with_components(settings, Prompts::default(), gateway.clone(), store);

        let learner = LearnerProfile::new("u1", "N4", "ja");
        let outcome = orchestrator
            .generation_service()
            .generate("Weekend plans", &learner, None)
            .await;
        assert!(outcome.success, "{:?}", outcome.error);
        assert_eq!(orchestrator.store().stats().await.unwrap().challenges, 2);

        let source =
            AudioSource::from_json(&json!({"blob_key": "k1", "filename": "a.wav"}), orchestrator.blobs())
                .unwrap();
        let transcribed = orchestrator.transcription_service().transcribe(&source).await;
        assert_eq!(transcribed.transcript.unwrap(), vec!["Hi.", "Bye."]);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
