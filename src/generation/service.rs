//! Topic generation service.

use super::prompt::{build_generation_messages, LearnerProfile};
use crate::config::{GenerationSettings, Prompts};
use crate::error::Result;
use crate::gateway::{ChatOptions, LlmGateway, OutputFormat};
use crate::parser::parse_generation;
use crate::store::{ContentStore, Topic};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result envelope returned to callers of [`TopicGenerationService::generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationOutcome {
    pub fn created(topic: Topic) -> Self {
        Self {
            success: true,
            topic: Some(topic),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            topic: None,
            error: Some(message.into()),
        }
    }
}

/// Generates a topic, its challenges and grammar points for a learner pair.
pub struct TopicGenerationService {
    gateway: Arc<dyn LlmGateway>,
    store: Arc<dyn ContentStore>,
    prompts: Prompts,
    settings: GenerationSettings,
}

impl TopicGenerationService {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        store: Arc<dyn ContentStore>,
        prompts: Prompts,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            gateway,
            store,
            prompts,
            settings,
        }
    }

    /// Generate and persist content for `topic_title`.
    ///
    /// Never fails: every error is reported through the returned envelope.
    #[instrument(skip(self, learner, partner), fields(learner = %learner.id))]
    pub async fn generate(
        &self,
        topic_title: &str,
        learner: &LearnerProfile,
        partner: Option<&LearnerProfile>,
    ) -> GenerationOutcome {
        match self.try_generate(topic_title, learner, partner).await {
            Ok(topic) => GenerationOutcome::created(topic),
            Err(e) => {
                warn!("Topic generation failed: {}", e);
                GenerationOutcome::failed(e.to_string())
            }
        }
    }

    async fn try_generate(
        &self,
        topic_title: &str,
        learner: &LearnerProfile,
        partner: Option<&LearnerProfile>,
    ) -> Result<Topic> {
        if partner.is_none() {
            info!("No partner for learner {}, pairing with self", learner.id);
        }

        let messages = build_generation_messages(&self.prompts, topic_title, learner, partner);
        let options = ChatOptions {
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            output_format: OutputFormat::JsonObject,
        };

        let raw = self.gateway.chat(&messages, &options).await?;
        let content = parse_generation(&raw)?;

        self.store.create_topic_with_content(topic_title, &content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LingopairError;
    use crate::gateway::scripted::ScriptedGateway;
    use crate::parser::GeneratedContent;
    use crate::store::{Challenge, GrammarPoint, SqliteContentStore, StoreStats};
    use async_trait::async_trait;

    fn reply(grammar_title: &str) -> String {
        format!(
            r#"{{
                "topic_content": {{"eng": "At the station", "jpn": "駅で"}},
                "challenges": [
                    {{"target_level": "N5", "content": {{"en": "Buy a ticket", "jp": "切符を買う"}}, "conversation": {{"en": "A", "jp": "A"}}}},
                    {{"target_level": "B1", "content": {{"en": "Ask directions", "jp": "道を聞く"}}, "conversation": {{"en": "B", "jp": "B"}}}}
                ],
                "grammar_points": [
                    {{"title": "{grammar_title}", "language": "Japanese", "level": "N5", "explanation": "where", "examples": "駅はどこですか"}}
                ]
            }}"#
        )
    }

    fn learner() -> LearnerProfile {
        LearnerProfile::new("1", "N5", "Japanese")
    }

    fn service(gateway: Arc<ScriptedGateway>, store: Arc<dyn ContentStore>) -> TopicGenerationService {
        TopicGenerationService::new(gateway, store, Prompts::default(), GenerationSettings::default())
    }

    #[tokio::test]
    async fn test_generate_persists_topic() {
        let gateway = Arc::new(ScriptedGateway::new().with_chat_reply(&reply("〜はどこですか")));
        let store = Arc::new(SqliteContentStore::in_memory().unwrap());
        let service = service(gateway.clone(), store.clone());

        let partner = LearnerProfile::new("2", "B1", "English");
        let outcome = service.generate("Station", &learner(), Some(&partner)).await;

        assert!(outcome.success, "{:?}", outcome.error);
        let topic = outcome.topic.unwrap();
        assert_eq!(topic.name, "Station");
        assert_eq!(store.challenges_for_topic(topic.id).await.unwrap().len(), 2);

        let calls = gateway.chat_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.len(), 2);
        assert_eq!(calls[0].1.output_format, OutputFormat::JsonObject);
        assert!((calls[0].1.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_two_runs_share_grammar_point() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_chat_reply(&reply("〜はどこですか"))
                .with_chat_reply(&reply("〜はどこですか")),
        );
        let store = Arc::new(SqliteContentStore::in_memory().unwrap());
        let service = service(gateway, store.clone());

        assert!(service.generate("Station", &learner(), None).await.success);
        assert!(service.generate("Airport", &learner(), None).await.success);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.grammar_points, 1);
        assert_eq!(stats.topic_grammar_points, 2);
    }

    #[tokio::test]
    async fn test_invalid_json_persists_nothing() {
        let gateway = Arc::new(ScriptedGateway::new().with_chat_reply("{\"topic_content\": {"));
        let store = Arc::new(SqliteContentStore::in_memory().unwrap());
        let service = service(gateway, store.clone());

        let outcome = service.generate("Station", &learner(), None).await;

        assert!(!outcome.success);
        assert!(outcome.topic.is_none());
        assert!(outcome.error.unwrap().starts_with("AI returned invalid JSON"));
        assert_eq!(store.stats().await.unwrap(), StoreStats::default());
    }

    #[tokio::test]
    async fn test_gateway_failure_is_enveloped() {
        let gateway = Arc::new(ScriptedGateway::new().with_chat_error("rate limited"));
        let store = Arc::new(SqliteContentStore::in_memory().unwrap());
        let service = service(gateway, store);

        let outcome = service.generate("Station", &learner(), None).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("rate limited"));
    }

    struct RejectingStore;

    #[async_trait]
    impl ContentStore for RejectingStore {
        async fn create_topic_with_content(&self, _: &str, _: &GeneratedContent) -> Result<Topic> {
            Err(LingopairError::Persistence("disk full".to_string()))
        }
        async fn get_topic(&self, _: i64) -> Result<Option<Topic>> {
            Ok(None)
        }
        async fn list_topics(&self) -> Result<Vec<Topic>> {
            Ok(Vec::new())
        }
        async fn challenges_for_topic(&self, _: i64) -> Result<Vec<Challenge>> {
            Ok(Vec::new())
        }
        async fn grammar_points_for_topic(&self, _: i64) -> Result<Vec<GrammarPoint>> {
            Ok(Vec::new())
        }
        async fn stats(&self) -> Result<StoreStats> {
            Ok(StoreStats::default())
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_is_enveloped() {
        let gateway = Arc::new(ScriptedGateway::new().with_chat_reply(&reply("〜です")));
        let service = service(gateway, Arc::new(RejectingStore));

        let outcome = service.generate("Station", &learner(), None).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Failed to save records: disk full"));
    }

    #[test]
    fn test_envelope_serialization_skips_empty_fields() {
        let json = serde_json::to_value(GenerationOutcome::failed("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }
}
