//! Prompt construction for topic generation.

use crate::config::Prompts;
use crate::gateway::ChatMessage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the prompt needs to know about a learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub id: String,
    /// Proficiency level, e.g. "N4" or "B1".
    pub level: String,
    /// Language the learner is studying.
    pub language: String,
}

impl LearnerProfile {
    pub fn new(id: impl Into<String>, level: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: level.into(),
            language: language.into(),
        }
    }
}

/// Build the system + user messages for a generation request.
///
/// Without a partner the learner's own profile fills both slots.
pub fn build_generation_messages(
    prompts: &Prompts,
    topic_title: &str,
    learner: &LearnerProfile,
    partner: Option<&LearnerProfile>,
) -> Vec<ChatMessage> {
    let partner = partner.unwrap_or(learner);

    let mut vars = HashMap::new();
    vars.insert("topic_title".to_string(), topic_title.to_string());
    vars.insert("user_one_id".to_string(), learner.id.clone());
    vars.insert("user_one_level".to_string(), learner.level.clone());
    vars.insert("user_one_language".to_string(), learner.language.clone());
    vars.insert("user_two_id".to_string(), partner.id.clone());
    vars.insert("user_two_level".to_string(), partner.level.clone());
    vars.insert("user_two_language".to_string(), partner.language.clone());

    vec![
        ChatMessage::system(prompts.render_with_custom(&prompts.generation.system, &vars)),
        ChatMessage::user(prompts.render_with_custom(&prompts.generation.user, &vars)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ChatRole;

    fn keiko() -> LearnerProfile {
        LearnerProfile::new("7", "N4", "Japanese")
    }

    fn sam() -> LearnerProfile {
        LearnerProfile::new("9", "B1", "English")
    }

    #[test]
    fn test_two_messages_with_schema() {
        let messages = build_generation_messages(&Prompts::default(), "Travel", &keiko(), Some(&sam()));

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
        for key in ["\"topic_content\"", "\"challenges\"", "\"grammar_points\""] {
            assert!(messages[0].content.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_user_message_embeds_both_profiles() {
        let messages = build_generation_messages(&Prompts::default(), "Travel", &keiko(), Some(&sam()));
        let user = &messages[1].content;

        assert!(user.contains("\"Travel\""));
        assert!(user.contains("Level \"N4\", Learning Language \"Japanese\""));
        assert!(user.contains("Level \"B1\", Learning Language \"English\""));
        assert!(!user.contains("{{"));
    }

    #[test]
    fn test_self_pairing_without_partner() {
        let messages = build_generation_messages(&Prompts::default(), "Food", &keiko(), None);
        let user = &messages[1].content;

        assert_eq!(messages.len(), 2);
        assert_eq!(user.matches("Level \"N4\", Learning Language \"Japanese\"").count(), 2);
        assert_eq!(user.matches("Id \"7\"").count(), 2);
        assert!(!user.contains("{{"));
    }

    #[test]
    fn test_deterministic() {
        let a = build_generation_messages(&Prompts::default(), "Food", &keiko(), Some(&sam()));
        let b = build_generation_messages(&Prompts::default(), "Food", &keiko(), Some(&sam()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_title_with_placeholder_is_kept_verbatim() {
        let title = "Say {{user_one_level}} please";
        for _ in 0..100 {
            let messages = build_generation_messages(&Prompts::default(), title, &keiko(), Some(&sam()));
            assert!(messages[1].content.contains("\"Say {{user_one_level}} please\""));
        }
    }
}
