//! Transcribe command implementation.

use crate::audio_source::AudioSource;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcription::TranscriptionOutcome;
use anyhow::Result;

/// Run the transcribe command.
pub async fn run_transcribe(source: &str, json: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Transcribe) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let outcome = match AudioSource::from_arg(source, orchestrator.blobs()) {
        Ok(audio) => {
            let spinner = (!json).then(|| Output::spinner("Transcribing..."));
            let outcome = orchestrator.transcription_service().transcribe(&audio).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            outcome
        }
        Err(e) => TranscriptionOutcome::invalid_source(&e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        match &outcome.transcript {
            Some(segments) if segments.is_empty() => {
                Output::warning("No speech detected.");
            }
            Some(segments) => {
                Output::header(&format!("Transcript ({} sentences)", segments.len()));
                for (i, segment) in segments.iter().enumerate() {
                    Output::segment(i + 1, segment);
                }
            }
            None => {
                Output::error(outcome.error.as_deref().unwrap_or("Transcription failed"));
            }
        }
    }

    if outcome.success {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{}",
            outcome.error.unwrap_or_else(|| "Transcription failed".to_string())
        ))
    }
}
