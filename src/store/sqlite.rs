//! SQLite-based content store.
//!
//! Generation runs are written inside a single `IMMEDIATE` transaction, so readers
//! never see a half-built topic and concurrent writers are serialized. Grammar point
//! deduplication relies on a `UNIQUE(title, language, level)` constraint plus
//! `INSERT .. ON CONFLICT DO NOTHING`, which keeps find-or-create atomic.

use super::{Challenge, ContentStore, GrammarPoint, StoreStats, Topic};
use crate::error::{LingopairError, Result};
use crate::parser::GeneratedContent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS topics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS challenges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    topic_id INTEGER NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
    target_level TEXT NOT NULL,
    content TEXT NOT NULL,
    conversation TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_challenges_topic_id ON challenges(topic_id);

CREATE TABLE IF NOT EXISTS grammar_points (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    language TEXT NOT NULL,
    level TEXT NOT NULL,
    explanation TEXT NOT NULL,
    examples TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (title, language, level)
);

CREATE TABLE IF NOT EXISTS topic_grammar_points (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    topic_id INTEGER NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
    grammar_point_id INTEGER NOT NULL REFERENCES grammar_points(id),
    created_at TEXT NOT NULL,
    UNIQUE (topic_id, grammar_point_id)
);
"#;

/// SQLite-based content store.
pub struct SqliteContentStore {
    conn: Mutex<Connection>,
}

impl SqliteContentStore {
    /// Open (or create) a store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::init_schema(&conn)?;

        info!("Initialized SQLite content store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LingopairError::Persistence(format!("Failed to acquire lock: {}", e)))
    }

    fn write_content(conn: &mut Connection, title: &str, content: &GeneratedContent) -> Result<Topic> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let topic = Self::insert_content(&tx, title, content)?;
        tx.commit()?;
        Ok(topic)
    }

    fn insert_content(
        tx: &Transaction<'_>,
        title: &str,
        content: &GeneratedContent,
    ) -> Result<Topic> {
        let now = Utc::now();
        let created_at = now.to_rfc3339();

        tx.execute(
            "INSERT INTO topics (name, content, created_at) VALUES (?1, ?2, ?3)",
            params![title, serde_json::to_string(&content.topic_content)?, created_at],
        )?;
        let topic_id = tx.last_insert_rowid();

        for challenge in &content.challenges {
            tx.execute(
                r#"
                INSERT INTO challenges (topic_id, target_level, content, conversation, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    topic_id,
                    challenge.target_level,
                    serde_json::to_string(&challenge.content)?,
                    serde_json::to_string(&challenge.conversation)?,
                    created_at,
                ],
            )?;
        }

        for gp in &content.grammar_points {
            let (gp_title, language, level) = (gp.title.trim(), gp.language.trim(), gp.level.trim());

            tx.execute(
                r#"
                INSERT INTO grammar_points (title, language, level, explanation, examples, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT (title, language, level) DO NOTHING
                "#,
                params![
                    gp_title,
                    language,
                    level,
                    gp.explanation,
                    serde_json::to_string(&gp.examples)?,
                    created_at,
                ],
            )?;

            let grammar_point_id: i64 = tx.query_row(
                "SELECT id FROM grammar_points WHERE title = ?1 AND language = ?2 AND level = ?3",
                params![gp_title, language, level],
                |row| row.get(0),
            )?;

            tx.execute(
                r#"
                INSERT INTO topic_grammar_points (topic_id, grammar_point_id, created_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT (topic_id, grammar_point_id) DO NOTHING
                "#,
                params![topic_id, grammar_point_id, created_at],
            )?;
        }

        Ok(Topic {
            id: topic_id,
            name: title.to_string(),
            content: content.topic_content.clone(),
            created_at: now,
        })
    }

    fn row_to_topic(row: &Row<'_>) -> rusqlite::Result<Topic> {
        Ok(Topic {
            id: row.get(0)?,
            name: row.get(1)?,
            content: json_column(row, 2)?,
            created_at: timestamp_column(row, 3)?,
        })
    }

    fn row_to_challenge(row: &Row<'_>) -> rusqlite::Result<Challenge> {
        Ok(Challenge {
            id: row.get(0)?,
            topic_id: row.get(1)?,
            target_level: row.get(2)?,
            content: json_column(row, 3)?,
            conversation: json_column(row, 4)?,
            created_at: timestamp_column(row, 5)?,
        })
    }

    fn row_to_grammar_point(row: &Row<'_>) -> rusqlite::Result<GrammarPoint> {
        Ok(GrammarPoint {
            id: row.get(0)?,
            title: row.get(1)?,
            language: row.get(2)?,
            level: row.get(3)?,
            explanation: row.get(4)?,
            examples: json_column(row, 5)?,
            created_at: timestamp_column(row, 6)?,
        })
    }
}

/// Decode a TEXT column holding JSON.
fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Value> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decode a TEXT column holding an RFC 3339 timestamp.
fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    #[instrument(skip(self, content), fields(challenges = content.challenges.len(), grammar_points = content.grammar_points.len()))]
    async fn create_topic_with_content(
        &self,
        title: &str,
        content: &GeneratedContent,
    ) -> Result<Topic> {
        let mut conn = self.lock()?;

        let topic = Self::write_content(&mut conn, title, content).map_err(|e| match e {
            LingopairError::Persistence(_) => e,
            other => LingopairError::Persistence(other.to_string()),
        })?;

        info!("Created topic {} ({:?})", topic.id, topic.name);
        Ok(topic)
    }

    async fn get_topic(&self, id: i64) -> Result<Option<Topic>> {
        let conn = self.lock()?;
        let topic = conn
            .query_row(
                "SELECT id, name, content, created_at FROM topics WHERE id = ?1",
                params![id],
                Self::row_to_topic,
            )
            .optional()?;
        Ok(topic)
    }

    async fn list_topics(&self) -> Result<Vec<Topic>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, name, content, created_at FROM topics ORDER BY id DESC")?;
        let topics = stmt
            .query_map([], Self::row_to_topic)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(topics)
    }

    async fn challenges_for_topic(&self, topic_id: i64) -> Result<Vec<Challenge>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, topic_id, target_level, content, conversation, created_at
            FROM challenges
            WHERE topic_id = ?1
            ORDER BY id
            "#,
        )?;
        let challenges = stmt
            .query_map(params![topic_id], Self::row_to_challenge)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!("Found {} challenges for topic {}", challenges.len(), topic_id);
        Ok(challenges)
    }

    async fn grammar_points_for_topic(&self, topic_id: i64) -> Result<Vec<GrammarPoint>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT gp.id, gp.title, gp.language, gp.level, gp.explanation, gp.examples, gp.created_at
            FROM grammar_points gp
            JOIN topic_grammar_points tgp ON tgp.grammar_point_id = gp.id
            WHERE tgp.topic_id = ?1
            ORDER BY tgp.id
            "#,
        )?;
        let points = stmt
            .query_map(params![topic_id], Self::row_to_grammar_point)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(points)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<u64> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as u64)
        };

        Ok(StoreStats {
            topics: count("topics")?,
            challenges: count("challenges")?,
            grammar_points: count("grammar_points")?,
            topic_grammar_points: count("topic_grammar_points")?,
        })
    }
}
