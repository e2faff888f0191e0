//! Lingopair CLI entry point.

use anyhow::Result;
use clap::Parser;
use lingopair::cli::commands::{self, GenerateArgs};
use lingopair::cli::{Cli, Commands};
use lingopair::config::Settings;
use lingopair::generation::LearnerProfile;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging: -v flags override the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("lingopair={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    match cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Generate {
            title,
            level,
            language,
            learner_id,
            partner_level,
            partner_language,
            partner_id,
            json,
        } => {
            let partner = match (partner_level, partner_language) {
                (Some(level), Some(language)) => {
                    Some(LearnerProfile::new(partner_id, level, language))
                }
                _ => None,
            };
            let args = GenerateArgs {
                title,
                learner: LearnerProfile::new(learner_id, level, language),
                partner,
                json,
            };
            commands::run_generate(args, settings).await?;
        }

        Commands::Transcribe { source, json } => {
            commands::run_transcribe(&source, json, settings).await?;
        }

        Commands::Topics => {
            commands::run_topics(settings).await?;
        }

        Commands::Show { id } => {
            commands::run_show(id, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
