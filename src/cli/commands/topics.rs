//! Topics command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::{ContentStore, SqliteContentStore};
use anyhow::Result;

/// Run the topics command.
pub async fn run_topics(settings: Settings) -> Result<()> {
    let store = SqliteContentStore::new(&settings.sqlite_path())?;

    let topics = match store.list_topics().await {
        Ok(topics) => topics,
        Err(e) => {
            Output::error(&format!("Failed to list topics: {}", e));
            return Err(e.into());
        }
    };

    if topics.is_empty() {
        Output::info("No topics yet. Use 'lingopair generate <title>' to create one.");
        return Ok(());
    }

    Output::header(&format!("Topics ({})", topics.len()));
    println!();
    for topic in &topics {
        Output::topic_info(
            topic.id,
            &topic.name,
            &topic.created_at.format("%Y-%m-%d %H:%M").to_string(),
        );
    }

    let stats = store.stats().await?;
    println!();
    Output::kv("Challenges", &stats.challenges.to_string());
    Output::kv("Grammar points", &stats.grammar_points.to_string());

    Ok(())
}
