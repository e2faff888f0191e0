//! Parsing and validation of raw model output.
//!
//! Two modes are supported:
//!
//! - **Generation**: the reply must be a JSON object with `topic_content`,
//!   `challenges` and `grammar_points`. Anything else is an
//!   [`LingopairError::InvalidAiResponse`]; there is no partial topic worth keeping.
//! - **Segmentation**: the reply should be a JSON array of strings, possibly wrapped
//!   in a markdown code fence. Malformed replies degrade to a single segment holding
//!   the whole transcript instead of failing.

use crate::error::{LingopairError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("valid regex"));
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?```\s*$").expect("valid regex"));

/// Validated topic generation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// Bilingual topic summary, e.g. `{"eng": "...", "jpn": "..."}`.
    pub topic_content: Value,
    pub challenges: Vec<ChallengeDraft>,
    pub grammar_points: Vec<GrammarPointDraft>,
}

/// A challenge as produced by the model, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeDraft {
    #[serde(default, deserialize_with = "scalar_string")]
    pub target_level: String,
    pub content: Value,
    pub conversation: Value,
}

/// A grammar point as produced by the model, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarPointDraft {
    #[serde(deserialize_with = "scalar_string")]
    pub title: String,
    #[serde(deserialize_with = "scalar_string")]
    pub language: String,
    #[serde(deserialize_with = "scalar_string")]
    pub level: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub explanation: String,
    #[serde(default)]
    pub examples: Value,
}

/// Accept any JSON scalar as text: numbers and booleans are stringified, null is empty.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Parse a generation reply into a [`GeneratedContent`].
pub fn parse_generation(raw: &str) -> Result<GeneratedContent> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| LingopairError::InvalidAiResponse(e.to_string()))?;

    if !value.is_object() {
        return Err(LingopairError::InvalidAiResponse(format!(
            "expected a JSON object, got {}",
            json_type_name(&value)
        )));
    }

    let content: GeneratedContent = serde_json::from_value(value)
        .map_err(|e| LingopairError::InvalidAiResponse(e.to_string()))?;

    content.validate()?;
    Ok(content)
}

impl GeneratedContent {
    fn validate(&self) -> Result<()> {
        if !self.topic_content.is_object() {
            return Err(LingopairError::InvalidAiResponse(
                "`topic_content` must be an object".to_string(),
            ));
        }

        for (idx, challenge) in self.challenges.iter().enumerate() {
            if challenge.content.is_null() || challenge.conversation.is_null() {
                return Err(LingopairError::InvalidAiResponse(format!(
                    "challenge {} is missing content or conversation",
                    idx
                )));
            }
        }

        for (idx, gp) in self.grammar_points.iter().enumerate() {
            if gp.title.trim().is_empty() || gp.language.trim().is_empty() || gp.level.trim().is_empty() {
                return Err(LingopairError::InvalidAiResponse(format!(
                    "grammar point {} needs a title, language and level",
                    idx
                )));
            }
        }

        if self.challenges.len() != 2 {
            warn!("Expected 2 challenges, model returned {}", self.challenges.len());
        }
        if !(1..=4).contains(&self.grammar_points.len()) {
            warn!(
                "Expected 1-4 grammar points, model returned {}",
                self.grammar_points.len()
            );
        }

        Ok(())
    }
}

/// Remove a leading and trailing markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let start = LEADING_FENCE.find(text).map(|m| m.end()).unwrap_or(0);
    let rest = &text[start..];
    let end = TRAILING_FENCE.find(rest).map(|m| m.start()).unwrap_or(rest.len());
    rest[..end].trim()
}

/// Result of parsing a segmentation reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Segmentation {
    /// The reply was a usable JSON array of sentences.
    Parsed(Vec<String>),
    /// The reply could not be used; the whole transcript becomes one segment.
    Fallback { reason: String, segments: Vec<String> },
}

impl Segmentation {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Segmentation::Fallback { .. })
    }

    pub fn into_segments(self) -> Vec<String> {
        match self {
            Segmentation::Parsed(segments) => segments,
            Segmentation::Fallback { segments, .. } => segments,
        }
    }
}

/// Parse a segmentation reply. Never fails: malformed replies fall back to `transcript`.
pub fn parse_segments(response: &str, transcript: &str) -> Segmentation {
    let normalized = strip_code_fence(response);

    match serde_json::from_str::<Vec<String>>(normalized) {
        Ok(sentences) => {
            let sentences: Vec<String> = sentences
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect();
            if sentences.is_empty() {
                fallback("reply contained no sentences".to_string(), transcript)
            } else {
                Segmentation::Parsed(sentences)
            }
        }
        Err(e) => fallback(e.to_string(), transcript),
    }
}

fn fallback(reason: String, transcript: &str) -> Segmentation {
    let segments = if transcript.trim().is_empty() {
        Vec::new()
    } else {
        vec![transcript.to_string()]
    };
    Segmentation::Fallback { reason, segments }
}

/// Human-readable name of a JSON value's type.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
