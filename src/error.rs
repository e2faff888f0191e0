//! Error types for Lingopair.

use thiserror::Error;

/// Library-level error type for Lingopair operations.
#[derive(Error, Debug)]
pub enum LingopairError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("AI returned invalid JSON: {0}")]
    InvalidAiResponse(String),

    #[error("Failed to save records: {0}")]
    Persistence(String),

    #[error("Unsupported audio source type: {0}")]
    UnsupportedSourceType(String),

    #[error("Invalid audio source: {0}")]
    InvalidAudioSource(String),

    #[error("Transcription failed: {0}")]
    TranscriptionUpstream(String),

    #[error("LLM gateway error: {0}")]
    Gateway(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Lingopair operations.
pub type Result<T> = std::result::Result<T, LingopairError>;
