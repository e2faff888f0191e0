//! Transcription pipeline for Lingopair.
//!
//! Audio is resolved to a readable path, transcribed by a speech-to-text model,
//! then split into sentences by a chat model. Segmentation replies that cannot
//! be used fall back to the whole transcript as a single segment.

mod pipeline;

pub use pipeline::{TranscriptionOutcome, TranscriptionService};

use std::fmt;

/// Stages a transcription request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptionStage {
    ResolvingSource,
    Transcribing,
    EmptyResult,
    Segmenting,
    Done,
}

impl fmt::Display for TranscriptionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TranscriptionStage::ResolvingSource => "resolving_source",
            TranscriptionStage::Transcribing => "transcribing",
            TranscriptionStage::EmptyResult => "empty_result",
            TranscriptionStage::Segmenting => "segmenting",
            TranscriptionStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}
