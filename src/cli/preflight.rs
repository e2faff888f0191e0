//! Pre-flight checks before commands that call the LLM provider.

use crate::error::{LingopairError, Result};

/// Operations with distinct requirements.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Topic generation requires an API key.
    Generate,
    /// Transcription requires an API key.
    Transcribe,
    /// Reading stored content only touches the local database.
    Browse,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Generate | Operation::Transcribe => check_api_key(),
        Operation::Browse => Ok(()),
    }
}

/// Check if OpenAI API key is configured.
pub fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(LingopairError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(LingopairError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
