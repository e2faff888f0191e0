//! Lingopair - paired conversation practice for language learners
//!
//! Generates bilingual learning content with an LLM and transcribes spoken
//! practice into sentences.
//!
//! # Overview
//!
//! Lingopair allows you to:
//! - Generate a topic, two challenges and a few grammar points for a pair of learners
//! - Store generated content with grammar points deduplicated across runs
//! - Transcribe recordings from files, stored blobs or uploads into sentences
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `gateway` - Chat and speech-to-text calls behind the [`gateway::LlmGateway`] trait
//! - `parser` - Validation of model replies
//! - `store` - Atomic persistence of generated content
//! - `generation` - Prompt building and the topic generation service
//! - `audio_source` - Audio source variants and resolution to file paths
//! - `transcription` - Transcribe-then-segment pipeline
//! - `orchestrator` - Wiring of the above
//!
//! # Example
//!
//! ```rust,no_run
//! use lingopair::config::Settings;
//! use lingopair::generation::LearnerProfile;
//! use lingopair::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = Orchestrator::new(Settings::load()?)?;
//!
//!     let learner = LearnerProfile::new("u1", "N4", "ja");
//!     let partner = LearnerProfile::new("u2", "B1", "en");
//!     let outcome = orchestrator
//!         .generation_service()
//!         .generate("Weekend plans", &learner, Some(&partner))
//!         .await;
//!     println!("success: {}", outcome.success);
//!
//!     Ok(())
//! }
//! ```

pub mod audio_source;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod openai;
pub mod orchestrator;
pub mod parser;
pub mod store;
pub mod transcription;

pub use error::{LingopairError, Result};
