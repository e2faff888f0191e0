//! Generate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::generation::{GenerationOutcome, LearnerProfile};
use crate::orchestrator::Orchestrator;
use crate::store::ContentStore;
use anyhow::Result;

/// Arguments of the generate command.
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub title: String,
    pub learner: LearnerProfile,
    pub partner: Option<LearnerProfile>,
    pub json: bool,
}

/// Run the generate command.
pub async fn run_generate(args: GenerateArgs, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Generate) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let service = orchestrator.generation_service();

    let spinner = (!args.json).then(|| Output::spinner(&format!("Generating '{}'...", args.title)));
    let outcome = service
        .generate(&args.title, &args.learner, args.partner.as_ref())
        .await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return finish(&outcome);
    }

    match &outcome.topic {
        Some(topic) => {
            Output::success(&format!("Created topic #{} '{}'", topic.id, topic.name));
            let store = orchestrator.store();
            let challenges = store.challenges_for_topic(topic.id).await?;
            let grammar_points = store.grammar_points_for_topic(topic.id).await?;
            Output::kv("Challenges", &challenges.len().to_string());
            Output::kv("Grammar points", &grammar_points.len().to_string());
            Output::info(&format!("Run 'lingopair show {}' to see it.", topic.id));
        }
        None => {
            Output::error(outcome.error.as_deref().unwrap_or("Generation failed"));
        }
    }

    finish(&outcome)
}

fn finish(outcome: &GenerationOutcome) -> Result<()> {
    if outcome.success {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{}",
            outcome.error.clone().unwrap_or_else(|| "Generation failed".to_string())
        ))
    }
}
