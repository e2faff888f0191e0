//! Configuration module for Lingopair.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{GenerationPrompts, Prompts, TranscriptionPrompts};
pub use settings::{
    DatabaseSettings, GeneralSettings, GenerationSettings, PromptSettings, Settings,
    StorageSettings, TranscriptionSettings,
};
