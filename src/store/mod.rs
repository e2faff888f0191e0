//! Persistence for generated learning content.
//!
//! A generation run produces one [`Topic`], its [`Challenge`]s and links to
//! deduplicated [`GrammarPoint`]s. [`ContentStore::create_topic_with_content`]
//! writes all of it as one atomic unit.

mod sqlite;

pub use sqlite::SqliteContentStore;

use crate::error::Result;
use crate::parser::GeneratedContent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A generated conversation topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    /// Display name (the requested topic title).
    pub name: String,
    /// Bilingual content blob.
    pub content: Value,
    pub created_at: DateTime<Utc>,
}

/// A challenge owned by exactly one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: i64,
    pub topic_id: i64,
    /// Proficiency level the challenge targets.
    pub target_level: String,
    pub content: Value,
    /// Bilingual conversation scaffold.
    pub conversation: Value,
    pub created_at: DateTime<Utc>,
}

/// A grammar point, unique by `(title, language, level)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarPoint {
    pub id: i64,
    pub title: String,
    pub language: String,
    pub level: String,
    pub explanation: String,
    pub examples: Value,
    pub created_at: DateTime<Utc>,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub topics: u64,
    pub challenges: u64,
    pub grammar_points: u64,
    pub topic_grammar_points: u64,
}

/// Trait for content store implementations.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create a topic with its challenges and grammar point links in one transaction.
    ///
    /// Grammar points are found or created by natural key; explanation and examples
    /// are only written when the grammar point is first created. On any failure
    /// nothing from this call is persisted.
    async fn create_topic_with_content(
        &self,
        title: &str,
        content: &GeneratedContent,
    ) -> Result<Topic>;

    /// Get a topic by ID.
    async fn get_topic(&self, id: i64) -> Result<Option<Topic>>;

    /// List all topics, newest first.
    async fn list_topics(&self) -> Result<Vec<Topic>>;

    /// Get the challenges of a topic in creation order.
    async fn challenges_for_topic(&self, topic_id: i64) -> Result<Vec<Challenge>>;

    /// Get the grammar points linked to a topic.
    async fn grammar_points_for_topic(&self, topic_id: i64) -> Result<Vec<GrammarPoint>>;

    /// Get row counts.
    async fn stats(&self) -> Result<StoreStats>;
}
