//! Init command - interactive first-run setup.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::store::SqliteContentStore;
use console::style;
use std::io::{self, Write};
use std::path::Path;

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Lingopair Setup");
    println!();

    // Step 1: API key
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    if let Err(e) = preflight::check_api_key() {
        Output::warning(&e.to_string());
        println!();
        println!("  Lingopair needs an OpenAI API key for generation and transcription.");
        println!("  Get your API key from: {}", style("https://platform.openai.com/api-keys").underlined());
        println!();

        if !prompt_continue("Continue without API key?")? {
            println!();
            Output::info("Setup cancelled. Set your API key and run 'lingopair init' again.");
            return Ok(());
        }
    } else {
        Output::success("OpenAI API key is configured!");
    }

    println!();

    // Step 2: Directories
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    ensure_dir("Data directory", &settings.data_dir())?;
    ensure_dir("Temp directory", &settings.temp_dir())?;
    ensure_dir("Blob storage", &settings.blob_root())?;

    println!();

    // Step 3: Database
    println!("{}", style("Step 3: Content database").bold().cyan());
    println!();

    let sqlite_path = settings.sqlite_path();
    if let Some(parent) = sqlite_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    SqliteContentStore::new(&sqlite_path)?;
    Output::success(&format!("Database ready: {}", sqlite_path.display()));

    println!();

    // Step 4: Config file
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!(
        "  {} Generate your first topic",
        style("lingopair generate \"Weekend plans\" --level N4 --language ja").cyan()
    );
    println!("  {} Transcribe a recording", style("lingopair transcribe <file>").cyan());
    println!();

    Ok(())
}

fn ensure_dir(label: &str, dir: &Path) -> io::Result<()> {
    if dir.exists() {
        Output::info(&format!("{} exists: {}", label, dir.display()));
    } else {
        std::fs::create_dir_all(dir)?;
        Output::success(&format!("Created {}: {}", label.to_lowercase(), dir.display()));
    }
    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_ensure_dir_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        ensure_dir("Nested", &nested).unwrap();
        assert!(nested.is_dir());
    }
}
