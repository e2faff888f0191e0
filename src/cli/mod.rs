//! CLI module for Lingopair.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{json_preview, Output};

use clap::{Parser, Subcommand};

/// Lingopair - paired conversation practice for language learners
///
/// Generates bilingual topics, challenges and grammar points for a pair of
/// learners, and transcribes spoken practice into sentences.
#[derive(Parser, Debug)]
#[command(name = "lingopair")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Lingopair: directories, database and config file
    Init,

    /// Generate a topic with challenges and grammar points
    Generate {
        /// Topic title (e.g. "Weekend plans")
        title: String,

        /// Proficiency level of the learner (e.g. "N4", "B1")
        #[arg(short, long)]
        level: String,

        /// Language the learner is learning (e.g. "ja")
        #[arg(long)]
        language: String,

        /// Learner identifier
        #[arg(long, default_value = "learner")]
        learner_id: String,

        /// Proficiency level of the partner
        #[arg(long, requires = "partner_language")]
        partner_level: Option<String>,

        /// Language the partner is learning
        #[arg(long, requires = "partner_level")]
        partner_language: Option<String>,

        /// Partner identifier
        #[arg(long, default_value = "partner")]
        partner_id: String,

        /// Print the result envelope as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transcribe audio into sentences
    Transcribe {
        /// Audio file path, or a JSON source descriptor such as
        /// '{"blob_key": "ab12", "filename": "memo.m4a"}'
        source: String,

        /// Print the result envelope as JSON
        #[arg(long)]
        json: bool,
    },

    /// List generated topics
    Topics,

    /// Show a topic with its challenges and grammar points
    Show {
        /// Topic ID
        id: i64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
