//! Topic generation: prompt construction and the generation service.

mod prompt;
mod service;

pub use prompt::{build_generation_messages, LearnerProfile};
pub use service::{GenerationOutcome, TopicGenerationService};
