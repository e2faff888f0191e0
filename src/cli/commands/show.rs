//! Show command implementation.

use crate::cli::{json_preview, Output};
use crate::config::Settings;
use crate::store::{ContentStore, SqliteContentStore};
use anyhow::Result;

/// Run the show command.
pub async fn run_show(id: i64, settings: Settings) -> Result<()> {
    let store = SqliteContentStore::new(&settings.sqlite_path())?;

    let Some(topic) = store.get_topic(id).await? else {
        Output::error(&format!("Topic #{} not found", id));
        return Err(anyhow::anyhow!("topic {} not found", id));
    };

    Output::header(&format!("#{} {}", topic.id, topic.name));
    Output::kv("Created", &topic.created_at.to_rfc3339());
    println!();
    println!("{}", serde_json::to_string_pretty(&topic.content)?);

    let challenges = store.challenges_for_topic(topic.id).await?;
    Output::header(&format!("Challenges ({})", challenges.len()));
    for challenge in &challenges {
        Output::list_item(&format!(
            "[{}] {}",
            challenge.target_level,
            json_preview(&challenge.content, 100)
        ));
    }

    let grammar_points = store.grammar_points_for_topic(topic.id).await?;
    Output::header(&format!("Grammar points ({})", grammar_points.len()));
    for point in &grammar_points {
        Output::list_item(&format!("{} ({}, {})", point.title, point.language, point.level));
        if !point.explanation.is_empty() {
            println!("      {}", point.explanation);
        }
    }

    Ok(())
}
