//! Prompt templates for Lingopair.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub generation: GenerationPrompts,
    pub transcription: TranscriptionPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for topic generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPrompts {
    pub system: String,
    pub user: String,
}

impl Default for GenerationPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert language learning assistant. Your task is to generate a topic, personalized challenges, and associated grammar points for two language learners.
You MUST respond with a single, valid JSON object and nothing else.
The JSON object must follow this exact structure:
{
  "topic_content": { "eng": "...", "jpn": "..." },
  "challenges": [
    { "target_level": "...", "content": { "en": "...", "jp": "..." }, "conversation": { "en": "...", "jp": "..." } },
    { "target_level": "...", "content": { "en": "...", "jp": "..." }, "conversation": { "en": "...", "jp": "..." } }
  ],
  "grammar_points": [ { "title": "...", "level": "...", "explanation": "...", "examples": "...", "language": "..." } ]
}
"challenges" must contain exactly two objects. "grammar_points" must contain between one and four objects."#
                .to_string(),

            user: r#"Generate learning content based on an existing topic title for a language-learning partnership.

- Topic Title: "{{topic_title}}"

- User 1 Profile: Id "{{user_one_id}}", Level "{{user_one_level}}", Learning Language "{{user_one_language}}"
- User 2 Profile: Id "{{user_two_id}}", Level "{{user_two_level}}", Learning Language "{{user_two_language}}"

Based on the provided topic title, generate:
1. A single `topic_content` summary in both English and Japanese.
2. An array called `challenges` containing TWO separate challenge objects:
  - The first challenge MUST be tailored for the User 1 Profile. Include their level in the `target_level` field.
  - The second challenge MUST be tailored for the User 2 Profile. Include their level in the `target_level` field.
3. An array of `grammar_points`:
  - 1-2 grammar points relevant to the User 1 Profile level and language.
  - 1-2 grammar points relevant to the User 2 Profile level and language."#
                .to_string(),
        }
    }
}

/// Prompts for the transcription pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionPrompts {
    /// Hint passed to the speech-to-text model.
    pub transcribe_hint: String,
    /// Sentence segmentation request. `{{transcript}}` is replaced with the raw text.
    pub segment: String,
}

impl Default for TranscriptionPrompts {
    fn default() -> Self {
        Self {
            transcribe_hint: "Transcribe this audio exactly word-for-word. Do not paraphrase or summarize. Include all languages spoken (English, Japanese, etc).".to_string(),

            segment: r#"Split the following transcription into individual sentences.
Return ONLY a valid JSON array of strings, nothing else.

IMPORTANT: Do NOT modify the text in any way.
Keep all words, spacing, and punctuation exactly as given.
Preserve Japanese in Japanese characters and English in Latin alphabet.

Transcription:
{{transcript}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let generation_path = custom_path.join("generation.toml");
            if generation_path.exists() {
                let content = std::fs::read_to_string(&generation_path)?;
                prompts.generation = toml::from_str(&content)?;
            }

            let transcription_path = custom_path.join("transcription.toml");
            if transcription_path.exists() {
                let content = std::fs::read_to_string(&transcription_path)?;
                prompts.transcription = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single pass over the template: inserted values are never
    /// re-scanned, and unknown placeholders are left as they are.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
